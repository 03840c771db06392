//! Background Mixer - 背景音乐混音
//!
//! 背景音乐循环/截断到人声长度，按 dB 衰减后垫在人声下方。

use super::AudioBuffer;

/// 背景音乐默认音量偏移（dB）
pub const DEFAULT_MUSIC_VOLUME_DB: f32 = -20.0;

/// 背景音乐混音器
#[derive(Debug, Clone)]
pub struct BackgroundMixer {
    volume_db: f32,
}

impl Default for BackgroundMixer {
    fn default() -> Self {
        Self::new(DEFAULT_MUSIC_VOLUME_DB)
    }
}

impl BackgroundMixer {
    pub fn new(volume_db: f32) -> Self {
        Self { volume_db }
    }

    pub fn volume_db(&self) -> f32 {
        self.volume_db
    }

    /// 将背景音乐混入人声
    ///
    /// 两路先统一到较高的采样率和较多的声道数；输出时长等于人声时长。
    pub fn mix(&self, voice: &AudioBuffer, music: &AudioBuffer) -> AudioBuffer {
        let sample_rate = voice.sample_rate().max(music.sample_rate());
        let channels = voice.channels().max(music.channels());

        let voice = voice.converted(sample_rate, channels);
        let music = music.converted(sample_rate, channels);

        let fitted = music.loop_to_frames(voice.frames());
        let attenuated = fitted.apply_gain(self.volume_db);

        tracing::debug!(
            voice_ms = voice.duration_ms(),
            music_ms = music.duration_ms(),
            volume_db = self.volume_db,
            sample_rate,
            channels,
            "Mixing background music"
        );

        voice.overlay(&attenuated)
    }
}
