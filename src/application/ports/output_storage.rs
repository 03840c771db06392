//! Output Storage Port - 出站端口
//!
//! 成品音频文件的存储抽象

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 输出存储错误
#[derive(Debug, Error)]
pub enum OutputStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Output Storage Port - 出站端口
///
/// 按文件名保存和读取成品音频，文件名不得包含路径成分
#[async_trait]
pub trait OutputStoragePort: Send + Sync {
    /// 文件名对应的完整路径
    fn output_path(&self, file_name: &str) -> Result<PathBuf, OutputStorageError>;

    /// 保存音频数据（同名文件会被覆盖）
    async fn save_output(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, OutputStorageError>;

    /// 读取音频数据
    async fn read_output(&self, file_name: &str) -> Result<Vec<u8>, OutputStorageError>;

    /// 检查文件是否存在
    async fn output_exists(&self, file_name: &str) -> bool;
}
