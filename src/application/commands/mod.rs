//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：故事音频生成

mod story_commands;

pub mod handlers;

pub use story_commands::*;
