//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Audio Context: 音频缓冲与处理（增强、混音、变速）
//! - Story Context: 故事记录与批处理
//!
//! 以及请求级合成参数和合成文本分段。

pub mod audio;
pub mod settings;
pub mod story;

// 合成请求前的文本分段
mod text_segmenter;

pub use settings::{SettingsError, SynthesisSettings};
pub use text_segmenter::{segment_text, segment_text_default, SegmentConfig, DEFAULT_MAX_CHARS};
