//! 请求级合成参数
//!
//! 每个请求构造一次，按值传入编排器，不持久化。

use thiserror::Error;

use super::audio::DEFAULT_MUSIC_VOLUME_DB;

pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;
pub const MIN_MUSIC_VOLUME_DB: f32 = -30.0;
pub const MAX_MUSIC_VOLUME_DB: f32 = 0.0;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("语速必须在 0.5 到 2.0 之间: {0}")]
    SpeedOutOfRange(f32),

    #[error("背景音乐音量必须在 -30 到 0 dB 之间: {0}")]
    MusicVolumeOutOfRange(f32),
}

/// 合成参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisSettings {
    speed: f32,
    music_volume_db: f32,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            music_volume_db: DEFAULT_MUSIC_VOLUME_DB,
        }
    }
}

impl SynthesisSettings {
    pub fn new(speed: f32, music_volume_db: f32) -> Result<Self, SettingsError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(SettingsError::SpeedOutOfRange(speed));
        }
        if !(MIN_MUSIC_VOLUME_DB..=MAX_MUSIC_VOLUME_DB).contains(&music_volume_db) {
            return Err(SettingsError::MusicVolumeOutOfRange(music_volume_db));
        }
        Ok(Self {
            speed,
            music_volume_db,
        })
    }

    pub fn with_speed(speed: f32) -> Result<Self, SettingsError> {
        Self::new(speed, DEFAULT_MUSIC_VOLUME_DB)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// 表单上选择的背景音乐音量
    ///
    /// 只做记录，混音始终使用 [`DEFAULT_MUSIC_VOLUME_DB`]。
    pub fn music_volume_db(&self) -> f32 {
        self.music_volume_db
    }
}
