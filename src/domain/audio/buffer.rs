//! Audio Buffer - 解码后的内存音频片段
//!
//! 样本以交错（interleaved）f32 形式存放，范围 [-1.0, 1.0]。
//! 所有变换都返回新的 buffer，不原地修改。

/// 解码后的音频片段
///
/// 不变量:
/// - `channels >= 1`，`sample_rate >= 1`
/// - `samples.len()` 是 `channels` 的整数倍
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// 从交错样本创建
    ///
    /// 末尾不完整的帧会被丢弃。
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let sample_rate = sample_rate.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// 指定帧数的静音
    pub fn silent(frames: usize, sample_rate: u32, channels: u16) -> Self {
        Self::new(vec![0.0; frames * channels.max(1) as usize], sample_rate, channels)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// 每声道的样本数
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 时长（毫秒，向下取整）
    pub fn duration_ms(&self) -> u64 {
        (self.frames() as u64 * 1000) / self.sample_rate as u64
    }

    /// 峰值幅度（绝对值最大的样本）
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// 峰值电平（dBFS），静音时为负无穷
    pub fn peak_dbfs(&self) -> f32 {
        let peak = self.peak();
        if peak <= 0.0 {
            f32::NEG_INFINITY
        } else {
            20.0 * peak.log10()
        }
    }

    /// 截取前 `frames` 帧
    pub fn take_frames(&self, frames: usize) -> AudioBuffer {
        let end = (frames * self.channels as usize).min(self.samples.len());
        AudioBuffer::new(self.samples[..end].to_vec(), self.sample_rate, self.channels)
    }

    /// 按声道拆分为平面（planar）格式
    pub fn to_planar(&self) -> Vec<Vec<f32>> {
        let channels = self.channels as usize;
        let mut planar = vec![Vec::with_capacity(self.frames()); channels];
        for frame in self.samples.chunks_exact(channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                planar[ch].push(sample);
            }
        }
        planar
    }

    /// 从平面格式重新交错
    ///
    /// 各声道长度不一致时按最短的声道截断。
    pub fn from_planar(planar: Vec<Vec<f32>>, sample_rate: u32) -> AudioBuffer {
        if planar.is_empty() {
            return AudioBuffer::new(Vec::new(), sample_rate, 1);
        }
        let channels = planar.len();
        let frames = planar.iter().map(Vec::len).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * channels);
        for i in 0..frames {
            for channel in &planar {
                samples.push(channel[i]);
            }
        }
        AudioBuffer::new(samples, sample_rate, channels as u16)
    }

    /// 转换声道数
    ///
    /// 单声道 → 多声道：复制；多声道 → 单声道：取平均；
    /// 其它组合按声道索引取模映射。
    pub fn with_channels(&self, channels: u16) -> AudioBuffer {
        let channels = channels.max(1);
        if channels == self.channels {
            return self.clone();
        }

        let src = self.channels as usize;
        let dst = channels as usize;
        let mut samples = Vec::with_capacity(self.frames() * dst);

        for frame in self.samples.chunks_exact(src) {
            if dst == 1 {
                samples.push(frame.iter().sum::<f32>() / src as f32);
            } else {
                for ch in 0..dst {
                    samples.push(frame[ch % src]);
                }
            }
        }

        AudioBuffer::new(samples, self.sample_rate, channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_frame_dropped() {
        let buffer = AudioBuffer::new(vec![0.1, 0.2, 0.3], 8000, 2);
        assert_eq!(buffer.frames(), 1);
        assert_eq!(buffer.samples(), &[0.1, 0.2]);
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::silent(24000, 24000, 1);
        assert_eq!(buffer.duration_ms(), 1000);
        let stereo = AudioBuffer::silent(22050, 44100, 2);
        assert_eq!(stereo.duration_ms(), 500);
    }

    #[test]
    fn test_peak_dbfs() {
        let buffer = AudioBuffer::new(vec![0.5, -1.0, 0.25], 8000, 1);
        assert_eq!(buffer.peak(), 1.0);
        assert!(buffer.peak_dbfs().abs() < 1e-6);
        assert_eq!(AudioBuffer::silent(10, 8000, 1).peak_dbfs(), f32::NEG_INFINITY);
    }

    #[test]
    fn test_planar_roundtrip_preserves_order() {
        let buffer = AudioBuffer::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 8000, 2);
        let planar = buffer.to_planar();
        assert_eq!(planar[0], vec![1.0, 3.0, 5.0]);
        assert_eq!(planar[1], vec![2.0, 4.0, 6.0]);
        assert_eq!(AudioBuffer::from_planar(planar, 8000), buffer);
    }

    #[test]
    fn test_channel_conversion() {
        let mono = AudioBuffer::new(vec![0.1, 0.2], 8000, 1);
        let stereo = mono.with_channels(2);
        assert_eq!(stereo.samples(), &[0.1, 0.1, 0.2, 0.2]);

        let back = stereo.with_channels(1);
        assert_eq!(back.frames(), 2);
        assert!((back.samples()[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_take_frames() {
        let buffer = AudioBuffer::new(vec![1.0, 2.0, 3.0, 4.0], 8000, 2);
        assert_eq!(buffer.take_frames(1).samples(), &[1.0, 2.0]);
        assert_eq!(buffer.take_frames(10).frames(), 2);
    }
}
