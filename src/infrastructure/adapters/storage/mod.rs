//! Storage Adapter - 成品音频文件存储

mod file_storage;

pub use file_storage::FileOutputStorage;
