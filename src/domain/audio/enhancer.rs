//! Audio Enhancer - 人声增强
//!
//! 归一化后叠加低频（低通 ×3）和高频（高通 ×1.5）强调层。

use super::effects::DEFAULT_HEADROOM_DB;
use super::AudioBuffer;

/// 低频强调截止频率（Hz）
pub const BASS_CUTOFF_HZ: f32 = 300.0;
/// 低频层幅度倍数
pub const BASS_BOOST: f32 = 3.0;
/// 高频强调截止频率（Hz）
pub const TREBLE_CUTOFF_HZ: f32 = 2000.0;
/// 高频层幅度倍数
pub const TREBLE_BOOST: f32 = 1.5;

/// 人声增强器
///
/// 参数固定，没有错误路径。
#[derive(Debug, Clone, Default)]
pub struct AudioEnhancer;

impl AudioEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// 增强人声，输出帧数与输入相同
    pub fn enhance(&self, voice: &AudioBuffer) -> AudioBuffer {
        let normalized = voice.normalize(DEFAULT_HEADROOM_DB);

        let bass = normalized.low_pass_filter(BASS_CUTOFF_HZ).scale(BASS_BOOST);
        let treble = normalized.high_pass_filter(TREBLE_CUTOFF_HZ).scale(TREBLE_BOOST);

        let enhanced = normalized.overlay(&bass).overlay(&treble);

        tracing::debug!(
            frames = enhanced.frames(),
            sample_rate = enhanced.sample_rate(),
            input_peak_dbfs = voice.peak_dbfs(),
            output_peak_dbfs = enhanced.peak_dbfs(),
            "Voice enhanced"
        );

        enhanced
    }
}
