//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，由表现层决定如何呈现

use thiserror::Error;

use crate::application::ports::{CodecError, OutputStorageError, TtsError};
use crate::domain::story::StoryError;
use crate::domain::SettingsError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 正文为空，未发起合成
    #[error("No text to synthesize")]
    EmptyText,

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 合成服务错误
    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    /// 编解码错误
    #[error("Codec error: {0}")]
    CodecError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        match err {
            TtsError::EmptyText => Self::EmptyText,
            other => Self::SynthesisError(other.to_string()),
        }
    }
}

impl From<CodecError> for ApplicationError {
    fn from(err: CodecError) -> Self {
        Self::CodecError(err.to_string())
    }
}

impl From<OutputStorageError> for ApplicationError {
    fn from(err: OutputStorageError) -> Self {
        match err {
            OutputStorageError::FileNotFound(name) => Self::not_found("Audio file", name),
            OutputStorageError::InvalidName(name) => {
                Self::ValidationError(format!("Invalid file name: {}", name))
            }
            OutputStorageError::IoError(msg) => Self::StorageError(msg),
        }
    }
}

impl From<StoryError> for ApplicationError {
    fn from(err: StoryError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<SettingsError> for ApplicationError {
    fn from(err: SettingsError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
