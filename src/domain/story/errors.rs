//! Story Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoryError {
    #[error("无效的标题: {0}")]
    InvalidTitle(String),

    #[error("故事标题重复: {0}")]
    DuplicateTitle(String),

    #[error("批处理中没有故事")]
    EmptyBatch,
}
