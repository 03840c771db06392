//! 变速不变调
//!
//! WSOLA (waveform-similarity overlap-add)：按目标速度在输入上取分析帧，
//! 在容差窗口内寻找与上一帧自然延续最相似的位置，加窗叠加输出。

use super::AudioBuffer;

/// 分析帧长度（毫秒）
const FRAME_MS: u32 = 40;
/// 相似度搜索容差（毫秒）
const SEARCH_MS: u32 = 10;
/// 最小帧长（帧）
const MIN_FRAME: usize = 16;

/// 变速器
#[derive(Debug, Clone, Copy)]
pub struct TimeStretcher {
    speed: f32,
}

impl TimeStretcher {
    /// `speed > 1` 加速（变短），`speed < 1` 减速（变长）
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// 速度为 1.0 时不做任何处理
    pub fn is_identity(&self) -> bool {
        (self.speed - 1.0).abs() < f32::EPSILON
    }

    /// 时间伸缩，输出帧数为 `round(frames / speed)`
    pub fn stretch(&self, buffer: &AudioBuffer) -> AudioBuffer {
        if self.is_identity() || self.speed <= 0.0 {
            return buffer.clone();
        }

        let channels = buffer.channels() as usize;
        let in_frames = buffer.frames();
        let out_frames = (in_frames as f64 / self.speed as f64).round() as usize;
        if in_frames == 0 || out_frames == 0 {
            return AudioBuffer::silent(0, buffer.sample_rate(), buffer.channels());
        }

        let win = (ms_to_frames(FRAME_MS, buffer.sample_rate()).max(MIN_FRAME) / 2) * 2;
        let hop_out = win / 2;
        let tolerance = ms_to_frames(SEARCH_MS, buffer.sample_rate());
        let window = hann(win);
        let mono = buffer.with_channels(1).into_samples();
        let input = buffer.samples();

        let mut output = vec![0.0f32; (out_frames + win) * channels];
        let mut weights = vec![0.0f32; out_frames + win];
        let mut prev_start = 0usize;
        let mut k = 0usize;

        loop {
            let out_pos = k * hop_out;
            if out_pos >= out_frames {
                break;
            }

            let start = if k == 0 {
                0
            } else {
                let nominal = (out_pos as f64 * self.speed as f64).round() as usize;
                best_alignment(&mono, prev_start + hop_out, nominal, tolerance, hop_out)
            };

            for (i, &w) in window.iter().enumerate() {
                let src = start + i;
                for c in 0..channels {
                    let sample = input.get(src * channels + c).copied().unwrap_or(0.0);
                    output[(out_pos + i) * channels + c] += sample * w;
                }
                weights[out_pos + i] += w;
            }

            prev_start = start;
            k += 1;
        }

        output.truncate(out_frames * channels);
        for (frame, &w) in output.chunks_exact_mut(channels).zip(&weights) {
            if w > 0.1 {
                for s in frame {
                    *s /= w;
                }
            }
        }

        tracing::debug!(
            speed = self.speed,
            in_frames,
            out_frames,
            frame_len = win,
            "Time-stretched audio"
        );

        AudioBuffer::new(output, buffer.sample_rate(), buffer.channels())
    }
}

fn ms_to_frames(ms: u32, sample_rate: u32) -> usize {
    (sample_rate as u64 * ms as u64 / 1000) as usize
}

/// 周期 Hann 窗，50% 重叠时叠加和恒为 1
fn hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / len as f32;
            0.5 - 0.5 * phase.cos()
        })
        .collect()
}

/// 在 `nominal ± tolerance` 内寻找与 `natural` 处波形互相关最大的起点
fn best_alignment(
    mono: &[f32],
    natural: usize,
    nominal: usize,
    tolerance: usize,
    overlap: usize,
) -> usize {
    let lo = nominal.saturating_sub(tolerance);
    let hi = nominal + tolerance;
    let sample = |idx: usize| mono.get(idx).copied().unwrap_or(0.0);

    let mut best = nominal;
    let mut best_score = f32::NEG_INFINITY;
    for candidate in lo..=hi {
        let score: f32 = (0..overlap)
            .step_by(2)
            .map(|j| sample(natural + j) * sample(candidate + j))
            .sum();
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, frames: usize, sample_rate: u32) -> AudioBuffer {
        let samples = (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        AudioBuffer::new(samples, sample_rate, 1)
    }

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    #[test]
    fn test_speed_one_is_noop() {
        let buffer = sine(440.0, 12_000, 24000);
        let stretcher = TimeStretcher::new(1.0);
        assert!(stretcher.is_identity());
        assert_eq!(stretcher.stretch(&buffer), buffer);
    }

    #[test]
    fn test_double_speed_halves_duration() {
        let buffer = sine(440.0, 24_000, 24000);
        let out = TimeStretcher::new(2.0).stretch(&buffer);
        assert_eq!(out.frames(), 12_000);
        assert_eq!(out.duration_ms(), buffer.duration_ms() / 2);
    }

    #[test]
    fn test_half_speed_doubles_duration() {
        let buffer = sine(440.0, 12_000, 24000);
        let out = TimeStretcher::new(0.5).stretch(&buffer);
        assert_eq!(out.frames(), 24_000);
    }

    #[test]
    fn test_pitch_preserved() {
        let buffer = sine(440.0, 48_000, 24000);
        let out = TimeStretcher::new(1.5).stretch(&buffer);

        // 跳过首尾各 0.1 秒的边缘
        let middle = &out.samples()[2400..out.frames() - 2400];
        let secs = middle.len() as f32 / 24000.0;
        let rate = zero_crossings(middle) as f32 / secs;
        assert!((rate - 880.0).abs() < 880.0 * 0.1, "crossing rate {}", rate);
    }

    #[test]
    fn test_stereo_and_short_input() {
        let buffer = sine(300.0, 100, 8000).with_channels(2);
        let out = TimeStretcher::new(2.0).stretch(&buffer);
        assert_eq!(out.channels(), 2);
        assert_eq!(out.frames(), 50);

        let empty = AudioBuffer::silent(0, 8000, 1);
        assert!(TimeStretcher::new(1.5).stretch(&empty).is_empty());
    }
}
