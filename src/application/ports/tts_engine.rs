//! TTS Engine Port - 语音合成抽象
//!
//! 定义外部合成服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use super::AudioFormat;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No text to speak")]
    EmptyText,
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要合成的文本
    pub text: String,
    /// 语言代码（如 `en`）
    pub lang: String,
}

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesisResponse {
    /// 编码后的音频数据
    pub audio_data: Vec<u8>,
    /// 音频数据的编码格式
    pub format: AudioFormat,
    /// 服务端请求次数（分段合成时大于 1）
    pub chunks: usize,
}

/// TTS Engine Port
///
/// 外部合成服务的抽象接口：文本 + 语言 → 编码音频
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 执行合成
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError>;

    /// 检查合成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
