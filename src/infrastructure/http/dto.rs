//! Data Transfer Objects

use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Story DTOs
// ============================================================================

/// 单个故事的生成结果
#[derive(Debug, Serialize)]
pub struct StoryAudioResponse {
    pub title: String,
    pub file_name: String,
    /// 播放地址
    pub audio_url: String,
    pub duration_ms: u64,
    pub size_bytes: usize,
    /// 内嵌 base64 数据的下载链接（HTML）
    pub download_link: String,
}

/// 批量生成结果：标题 → 生成结果
#[derive(Debug, Serialize)]
pub struct BatchAudioResponse {
    pub count: usize,
    pub outputs: BTreeMap<String, StoryAudioResponse>,
}
