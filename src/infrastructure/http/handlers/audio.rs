//! Audio Handlers - 成品音频流式下载

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::GetOutputAudio;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 流式返回成品音频（供页面播放）
pub async fn stream_audio(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let info = state
        .get_output_audio_handler
        .handle(GetOutputAudio { file_name })
        .await?;

    let file = tokio::fs::File::open(&info.path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open audio file: {}", e)))?;

    // 流式返回文件内容
    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, info.content_type)
        .header(header::CONTENT_LENGTH, info.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", info.file_name.replace('"', "_")),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
