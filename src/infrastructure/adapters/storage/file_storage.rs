//! File Storage - 文件系统成品音频存储
//!
//! 实现 OutputStoragePort trait，所有文件平铺在输出目录下

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::application::ports::{OutputStorageError, OutputStoragePort};

/// 文件系统输出存储
pub struct FileOutputStorage {
    /// 输出根目录
    base_dir: PathBuf,
}

impl FileOutputStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, OutputStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| OutputStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    /// 获取输出根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// 文件名只能是单个普通路径成分
fn validate_name(file_name: &str) -> Result<(), OutputStorageError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !file_name.contains(['/', '\\']) => Ok(()),
        _ => Err(OutputStorageError::InvalidName(file_name.to_string())),
    }
}

#[async_trait]
impl OutputStoragePort for FileOutputStorage {
    fn output_path(&self, file_name: &str) -> Result<PathBuf, OutputStorageError> {
        validate_name(file_name)?;
        Ok(self.base_dir.join(file_name))
    }

    async fn save_output(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, OutputStorageError> {
        let path = self.output_path(file_name)?;

        fs::write(&path, data)
            .await
            .map_err(|e| OutputStorageError::IoError(e.to_string()))?;

        tracing::debug!("Saved output: file={}, size={} bytes", file_name, data.len());

        Ok(path)
    }

    async fn read_output(&self, file_name: &str) -> Result<Vec<u8>, OutputStorageError> {
        let path = self.output_path(file_name)?;

        if !path.is_file() {
            return Err(OutputStorageError::FileNotFound(file_name.to_string()));
        }

        fs::read(&path)
            .await
            .map_err(|e| OutputStorageError::IoError(e.to_string()))
    }

    async fn output_exists(&self, file_name: &str) -> bool {
        match self.output_path(file_name) {
            Ok(path) => path.is_file(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_read_output() {
        let temp_dir = tempdir().unwrap();
        let storage = FileOutputStorage::new(temp_dir.path()).await.unwrap();

        let data = b"fake mp3 data";

        // Save
        let path = storage.save_output("story_20240101_120000.mp3", data).await.unwrap();
        assert!(path.exists());
        assert_eq!(path.parent().unwrap(), temp_dir.path());

        // Read
        let read_data = storage.read_output("story_20240101_120000.mp3").await.unwrap();
        assert_eq!(read_data, data);

        // Exists
        assert!(storage.output_exists("story_20240101_120000.mp3").await);
        assert!(!storage.output_exists("other.mp3").await);
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let storage = FileOutputStorage::new(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.base_dir(), nested.as_path());
    }

    #[tokio::test]
    async fn test_rejects_path_components() {
        let temp_dir = tempdir().unwrap();
        let storage = FileOutputStorage::new(temp_dir.path()).await.unwrap();

        for name in ["../x.mp3", "a/b.mp3", "/etc/passwd", "..", ".", "", "a\\b.mp3"] {
            assert!(
                matches!(storage.output_path(name), Err(OutputStorageError::InvalidName(_))),
                "accepted {:?}",
                name
            );
        }
        assert!(!storage.output_exists("../x.mp3").await);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp_dir = tempdir().unwrap();
        let storage = FileOutputStorage::new(temp_dir.path()).await.unwrap();
        let err = storage.read_output("missing.mp3").await.unwrap_err();
        assert!(matches!(err, OutputStorageError::FileNotFound(_)));
    }
}
