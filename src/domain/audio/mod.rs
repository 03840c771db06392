//! Audio Context - 音频处理
//!
//! 职责:
//! - 内存音频片段（AudioBuffer）
//! - 基础效果：归一化、滤波、增益、叠加、循环、重采样
//! - 人声增强、背景混音、变速

mod buffer;
mod effects;
mod enhancer;
mod mixer;
mod resample;
mod speed;

pub use buffer::AudioBuffer;
pub use effects::{db_to_gain, DEFAULT_HEADROOM_DB};
pub use enhancer::{AudioEnhancer, BASS_BOOST, BASS_CUTOFF_HZ, TREBLE_BOOST, TREBLE_CUTOFF_HZ};
pub use mixer::{BackgroundMixer, DEFAULT_MUSIC_VOLUME_DB};
pub use speed::TimeStretcher;
