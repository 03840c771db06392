//! Story Context - 故事限界上下文
//!
//! 职责:
//! - 故事记录（标题 + 正文）
//! - 批处理映射（标题唯一）
//! - 输出文件命名

mod errors;
mod value_objects;

pub use errors::StoryError;
pub use value_objects::{
    numbered_output_file_name, output_file_name, Story, StoryBatch, StoryTitle, DEFAULT_TITLE,
};
