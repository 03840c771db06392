//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：成品音频的读取

mod audio_queries;

pub mod handlers;

pub use audio_queries::*;
