//! 采样率转换
//!
//! 基于 rubato 的多项式插值重采样；rubato 初始化失败时退化为线性插值。

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use super::AudioBuffer;

impl AudioBuffer {
    /// 转换到目标采样率
    ///
    /// 输出帧数固定为 `round(frames * to / from)`。
    pub fn resampled(&self, sample_rate: u32) -> AudioBuffer {
        let sample_rate = sample_rate.max(1);
        if sample_rate == self.sample_rate() {
            return self.clone();
        }

        let ratio = sample_rate as f64 / self.sample_rate() as f64;
        let expected_frames = (self.frames() as f64 * ratio).round() as usize;

        if self.is_empty() {
            return AudioBuffer::silent(0, sample_rate, self.channels());
        }

        tracing::debug!(
            from = self.sample_rate(),
            to = sample_rate,
            channels = self.channels(),
            frames = self.frames(),
            "Resampling audio"
        );

        let planar = match resample_planar(&self.to_planar(), ratio) {
            Ok(planar) => planar,
            Err(e) => {
                tracing::warn!("Polynomial resampler unavailable ({}), using linear interpolation", e);
                linear_resample_planar(&self.to_planar(), ratio)
            }
        };

        let planar = planar
            .into_iter()
            .map(|mut channel| {
                channel.resize(expected_frames, 0.0);
                channel
            })
            .collect();

        AudioBuffer::from_planar(planar, sample_rate)
    }

    /// 转换到指定格式（采样率 + 声道数）
    pub fn converted(&self, sample_rate: u32, channels: u16) -> AudioBuffer {
        self.with_channels(channels).resampled(sample_rate)
    }
}

fn resample_planar(planar: &[Vec<f32>], ratio: f64) -> Result<Vec<Vec<f32>>, String> {
    let frames = planar.first().map(Vec::len).unwrap_or(0);
    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0,
        PolynomialDegree::Septic,
        frames,
        planar.len(),
    )
    .map_err(|e| e.to_string())?;

    resampler
        .process(planar, None)
        .map_err(|e| e.to_string())
}

fn linear_resample_planar(planar: &[Vec<f32>], ratio: f64) -> Vec<Vec<f32>> {
    planar
        .iter()
        .map(|channel| {
            let frame_count = channel.len();
            let new_frame_count = (frame_count as f64 * ratio) as usize;
            (0..new_frame_count)
                .map(|i| {
                    let src_pos = i as f64 / ratio;
                    let src_idx = src_pos as usize;
                    let frac = (src_pos - src_idx as f64) as f32;
                    let s0 = channel.get(src_idx).copied().unwrap_or(0.0);
                    let s1 = channel.get(src_idx + 1).copied().unwrap_or(s0);
                    s0 + (s1 - s0) * frac
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frames: usize, sample_rate: u32) -> AudioBuffer {
        let samples = (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        AudioBuffer::new(samples, sample_rate, 1)
    }

    #[test]
    fn test_same_rate_is_copy() {
        let buffer = tone(100, 8000);
        assert_eq!(buffer.resampled(8000), buffer);
    }

    #[test]
    fn test_upsample_frame_count() {
        let buffer = tone(24000, 24000);
        let out = buffer.resampled(44100);
        assert_eq!(out.sample_rate(), 44100);
        assert_eq!(out.frames(), 44100);
        assert_eq!(out.duration_ms(), buffer.duration_ms());
    }

    #[test]
    fn test_downsample_stereo() {
        let buffer = tone(4410, 44100).with_channels(2);
        let out = buffer.resampled(22050);
        assert_eq!(out.channels(), 2);
        assert_eq!(out.frames(), 2205);
    }

    #[test]
    fn test_linear_fallback_length() {
        let planar = vec![vec![0.0, 1.0, 0.0, -1.0]];
        let out = linear_resample_planar(&planar, 2.0);
        assert_eq!(out[0].len(), 8);
        assert!((out[0][1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_converted_format() {
        let out = tone(8000, 8000).converted(16000, 2);
        assert_eq!(out.sample_rate(), 16000);
        assert_eq!(out.channels(), 2);
        assert_eq!(out.frames(), 16000);
    }
}
