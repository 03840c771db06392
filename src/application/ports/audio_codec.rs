//! Audio Codec Port - 音频编解码抽象
//!
//! 解码 MP3/WAV 为内存 buffer，导出为 MP3。
//! 编解码是 CPU 密集的阻塞操作，调用方负责放到阻塞线程池执行。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::audio::AudioBuffer;

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// 音频容器/编码格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| CodecError::UnsupportedFormat(s.to_string()))
    }
}

/// MP3 导出配置
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// 比特率（kbps）
    pub bitrate_kbps: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self { bitrate_kbps: 192 }
    }
}

/// Audio Codec Port
pub trait AudioCodecPort: Send + Sync {
    /// 解码音频数据
    ///
    /// `hint` 为 None 时根据内容探测格式。
    fn decode(&self, data: &[u8], hint: Option<AudioFormat>) -> Result<AudioBuffer, CodecError>;

    /// 编码为 MP3
    fn encode_mp3(&self, buffer: &AudioBuffer, config: &EncodeConfig) -> Result<Vec<u8>, CodecError>;
}
