//! Audio Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioFormat, OutputStoragePort};
use crate::application::queries::audio_queries::{GetOutputAudio, OutputAudioData, OutputAudioInfo};

/// 由文件扩展名推断 Content-Type
fn content_type_for(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .and_then(|(_, ext)| AudioFormat::from_extension(ext))
        .unwrap_or(AudioFormat::Mp3)
        .content_type()
        .to_string()
}

/// GetOutputAudio Handler
pub struct GetOutputAudioHandler {
    storage: Arc<dyn OutputStoragePort>,
}

impl GetOutputAudioHandler {
    pub fn new(storage: Arc<dyn OutputStoragePort>) -> Self {
        Self { storage }
    }

    /// 查询文件位置和大小
    pub async fn handle(&self, query: GetOutputAudio) -> Result<OutputAudioInfo, ApplicationError> {
        let path = self.storage.output_path(&query.file_name)?;
        if !self.storage.output_exists(&query.file_name).await {
            return Err(ApplicationError::not_found("Audio file", query.file_name));
        }

        let size_bytes = tokio::fs::metadata(&path).await?.len();

        Ok(OutputAudioInfo {
            content_type: content_type_for(&query.file_name),
            file_name: query.file_name,
            path,
            size_bytes,
        })
    }

    /// 读取完整文件内容
    pub async fn read(&self, query: GetOutputAudio) -> Result<OutputAudioData, ApplicationError> {
        let audio_data = self.storage.read_output(&query.file_name).await?;

        Ok(OutputAudioData {
            content_type: content_type_for(&query.file_name),
            file_name: query.file_name,
            audio_data,
        })
    }
}
