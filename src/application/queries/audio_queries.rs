//! Audio Queries - 成品音频查询

use std::path::PathBuf;

/// 获取成品音频
#[derive(Debug, Clone)]
pub struct GetOutputAudio {
    pub file_name: String,
}

/// 成品音频位置信息（用于流式下载）
#[derive(Debug, Clone)]
pub struct OutputAudioInfo {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub content_type: String,
}

/// 成品音频内容（用于内嵌下载链接）
#[derive(Debug, Clone)]
pub struct OutputAudioData {
    pub file_name: String,
    pub audio_data: Vec<u8>,
    pub content_type: String,
}
