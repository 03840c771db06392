//! Story HTTP Handlers
//!
//! - generate: 单个故事（可选背景音乐）
//! - batch: 多个 .txt 文件，文件名作为标题

use axum::extract::multipart::Field;
use axum::{
    extract::{Multipart, State},
    Json,
};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;

use crate::application::{
    ApplicationError, AudioFormat, BackgroundMusic, BatchCreateStoryAudio, CreateStoryAudio,
    GetOutputAudio, StoryAudio,
};
use crate::domain::story::{Story, StoryBatch, StoryTitle, DEFAULT_TITLE};
use crate::domain::SynthesisSettings;
use crate::infrastructure::http::download::download_link_html;
use crate::infrastructure::http::dto::{ApiResponse, BatchAudioResponse, StoryAudioResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

const STORY_ERROR_PREFIX: &str = "An error occurred";
const BATCH_ERROR_PREFIX: &str = "An error occurred during batch processing";
/// 单个故事下载链接文字
const STORY_LINK_LABEL: &str = "audio file";

/// 读取文本字段
async fn field_text(field: Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))
}

/// 解析数值字段，空值使用默认值
fn parse_number(value: &str, name: &str, default: f32) -> Result<f32, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", name, value)))
}

/// 上传文件名的小写扩展名
fn file_extension(file_name: Option<&str>) -> Option<String> {
    file_name
        .and_then(|f| Path::new(f).extension())
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// 播放地址：`{base_url}/api/audio/{file_name}`
fn audio_url(base_url: &str, file_name: &str) -> Result<String, ApiError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::Internal(format!("Invalid base URL {}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Internal(format!("Invalid base URL: {}", base_url)))?
        .pop_if_empty()
        .extend(["api", "audio", file_name]);
    Ok(url.to_string())
}

/// 批处理错误统一带批处理前缀，空正文也不例外
fn batch_error(e: ApplicationError) -> ApiError {
    match e {
        ApplicationError::EmptyText => ApiError::Warning(format!(
            "{}: {}",
            BATCH_ERROR_PREFIX,
            ApplicationError::EmptyText
        )),
        other => ApiError::from(other).context(BATCH_ERROR_PREFIX),
    }
}

/// 同名文件后上传的覆盖先上传的，位置保持首次出现的顺序
fn upsert_file(files: &mut Vec<(String, String)>, file_name: String, text: String) {
    match files.iter_mut().find(|(name, _)| *name == file_name) {
        Some(entry) => {
            tracing::debug!(file_name = %file_name, "Duplicate upload replaces earlier file");
            entry.1 = text;
        }
        None => files.push((file_name, text)),
    }
}

/// 生成结果 → 响应体（含内嵌下载链接）
async fn to_response(
    state: &AppState,
    audio: StoryAudio,
    link_label: &str,
) -> Result<StoryAudioResponse, ApiError> {
    let data = state
        .get_output_audio_handler
        .read(GetOutputAudio {
            file_name: audio.file_name.clone(),
        })
        .await?;

    Ok(StoryAudioResponse {
        audio_url: audio_url(&state.base_url, &audio.file_name)?,
        download_link: download_link_html(&data.audio_data, &audio.file_name, link_label),
        title: audio.title,
        file_name: audio.file_name,
        duration_ms: audio.duration_ms,
        size_bytes: audio.size_bytes,
    })
}

/// 表单 → 单个故事命令
fn story_command(
    title: String,
    text: String,
    speed: f32,
    music_volume: f32,
    background: Option<BackgroundMusic>,
) -> Result<CreateStoryAudio, ApplicationError> {
    Ok(CreateStoryAudio {
        story: Story::new(StoryTitle::new(title)?, text),
        background,
        settings: SynthesisSettings::new(speed, music_volume)?,
    })
}

/// 上传文件 → 批量命令
fn batch_command(
    files: Vec<(String, String)>,
    speed: f32,
) -> Result<BatchCreateStoryAudio, ApplicationError> {
    Ok(BatchCreateStoryAudio {
        batch: StoryBatch::from_pairs(files)?,
        background: None,
        settings: SynthesisSettings::with_speed(speed)?,
    })
}

/// 生成单个故事音频
pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<StoryAudioResponse>>, ApiError> {
    let mut title: Option<String> = None;
    let mut text = String::new();
    let mut speed = 1.0;
    let mut music_volume = state.default_music_volume_db;
    let mut background: Option<BackgroundMusic> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "title" => title = Some(field_text(field, "title").await?),
            "text" => text = field_text(field, "text").await?,
            "speed" => speed = parse_number(&field_text(field, "speed").await?, "speed", 1.0)?,
            "music_volume" => {
                music_volume = parse_number(
                    &field_text(field, "music_volume").await?,
                    "music_volume",
                    state.default_music_volume_db,
                )?
            }
            "background" => {
                let ext = file_extension(field.file_name());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

                // 浏览器未选择文件时也会提交一个空的文件字段
                if data.is_empty() {
                    continue;
                }

                let format = match ext.as_deref() {
                    Some(ext) => Some(AudioFormat::from_extension(ext).ok_or_else(|| {
                        ApiError::BadRequest("Only MP3 and WAV background files are allowed".to_string())
                    })?),
                    None => None,
                };
                background = Some(BackgroundMusic::new(data.to_vec(), format));
            }
            _ => {}
        }
    }

    let title = match title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    };

    let command = story_command(title, text, speed, music_volume, background)
        .map_err(|e| ApiError::from(e).context(STORY_ERROR_PREFIX))?;

    let audio = state
        .create_story_handler
        .handle(command)
        .await
        .map_err(|e| ApiError::from(e).context(STORY_ERROR_PREFIX))?;

    let response = to_response(&state, audio, STORY_LINK_LABEL)
        .await
        .map_err(|e| e.context(STORY_ERROR_PREFIX))?;

    Ok(Json(ApiResponse::success(response)))
}

/// 批量生成：每个 .txt 文件一个故事
pub async fn generate_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<BatchAudioResponse>>, ApiError> {
    let mut speed = 1.0;
    let mut files: Vec<(String, String)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "speed" => speed = parse_number(&field_text(field, "speed").await?, "speed", 1.0)?,
            "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_extension(Some(&file_name)).as_deref() != Some("txt") {
                    return Err(ApiError::BadRequest(format!(
                        "Only .txt files are allowed: {}",
                        file_name
                    )));
                }
                let text = field_text(field, "file").await?;
                upsert_file(&mut files, file_name, text);
            }
            _ => {}
        }
    }

    let command = batch_command(files, speed).map_err(batch_error)?;

    let result = state
        .batch_story_handler
        .handle(command)
        .await
        .map_err(batch_error)?;

    let mut outputs = std::collections::BTreeMap::new();
    for (title, audio) in result.outputs {
        let label = format!("audio for {}", title);
        let response = to_response(&state, audio, &label)
            .await
            .map_err(|e| e.context(BATCH_ERROR_PREFIX))?;
        outputs.insert(title, response);
    }

    Ok(Json(ApiResponse::success(BatchAudioResponse {
        count: outputs.len(),
        outputs,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_url_encodes_file_name() {
        let url = audio_url("http://localhost:5060", "My Story_20240101_000000.mp3").unwrap();
        assert_eq!(
            url,
            "http://localhost:5060/api/audio/My%20Story_20240101_000000.mp3"
        );
    }

    #[test]
    fn test_audio_url_with_trailing_slash() {
        let url = audio_url("http://example.com/app/", "a.mp3").unwrap();
        assert_eq!(url, "http://example.com/app/api/audio/a.mp3");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("", "speed", 1.0).unwrap(), 1.0);
        assert_eq!(parse_number(" 1.5 ", "speed", 1.0).unwrap(), 1.5);
        assert!(parse_number("fast", "speed", 1.0).is_err());
    }

    #[test]
    fn test_story_command_validates_settings() {
        let err = story_command("t".into(), "hi".into(), 3.0, -20.0, None).unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        // 音量越界同样被拒绝，即使它不参与混音
        assert!(story_command("t".into(), "hi".into(), 1.0, 5.0, None).is_err());
        assert!(story_command("t".into(), "hi".into(), 1.0, -30.0, None).is_ok());
    }

    #[test]
    fn test_batch_command_rejects_duplicates() {
        let files = vec![
            ("a".to_string(), "x".to_string()),
            ("a".to_string(), "y".to_string()),
        ];
        assert!(batch_command(files, 1.0).is_err());
    }

    #[test]
    fn test_upsert_file_last_upload_wins() {
        let mut files = Vec::new();
        upsert_file(&mut files, "a.txt".into(), "first".into());
        upsert_file(&mut files, "b.txt".into(), "other".into());
        upsert_file(&mut files, "a.txt".into(), "second".into());
        assert_eq!(
            files,
            vec![
                ("a.txt".to_string(), "second".to_string()),
                ("b.txt".to_string(), "other".to_string()),
            ]
        );

        // 大小写不同的文件名是不同的故事
        upsert_file(&mut files, "a.TXT".into(), "upper".into());
        assert_eq!(files.len(), 3);
        assert!(batch_command(files, 1.0).is_ok());
    }

    #[test]
    fn test_batch_error_prefixes_empty_text() {
        let err = batch_error(ApplicationError::EmptyText);
        assert_eq!(err.errno(), 422);
        assert_eq!(
            err.message(),
            "An error occurred during batch processing: No text to synthesize"
        );

        let err = batch_error(ApplicationError::validation("bad"));
        assert_eq!(err.message(), "An error occurred during batch processing: bad");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(Some("Song.MP3")).as_deref(), Some("mp3"));
        assert_eq!(file_extension(Some("noext")), None);
        assert_eq!(file_extension(None), None);
    }
}
