//! 基础音频效果
//!
//! 增强器和混音器共用的原语：归一化、增益、单极点 RC 低通/高通、叠加、循环。

use super::AudioBuffer;

/// 归一化默认留出的余量（dB），峰值落在 -0.1 dBFS
pub const DEFAULT_HEADROOM_DB: f32 = 0.1;

/// dB 转线性倍数
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

impl AudioBuffer {
    /// 峰值归一化到 `-headroom_db` dBFS
    ///
    /// 静音片段原样返回。
    pub fn normalize(&self, headroom_db: f32) -> AudioBuffer {
        let peak = self.peak();
        if peak <= 0.0 {
            return self.clone();
        }
        let target = db_to_gain(-headroom_db);
        self.scale(target / peak)
    }

    /// 线性缩放幅度
    pub fn scale(&self, factor: f32) -> AudioBuffer {
        let samples = self.samples().iter().map(|s| s * factor).collect();
        AudioBuffer::new(samples, self.sample_rate(), self.channels())
    }

    /// 叠加 dB 增益（负值衰减）
    pub fn apply_gain(&self, db: f32) -> AudioBuffer {
        self.scale(db_to_gain(db))
    }

    /// 单极点 RC 低通滤波
    pub fn low_pass_filter(&self, cutoff_hz: f32) -> AudioBuffer {
        let rc = 1.0 / (cutoff_hz * 2.0 * std::f32::consts::PI);
        let dt = 1.0 / self.sample_rate() as f32;
        let alpha = dt / (rc + dt);

        self.map_channels(|input, output| {
            let mut last = input[0];
            output.push(last);
            for &x in &input[1..] {
                last += alpha * (x - last);
                output.push(last);
            }
        })
    }

    /// 单极点 RC 高通滤波
    pub fn high_pass_filter(&self, cutoff_hz: f32) -> AudioBuffer {
        let rc = 1.0 / (cutoff_hz * 2.0 * std::f32::consts::PI);
        let dt = 1.0 / self.sample_rate() as f32;
        let alpha = rc / (rc + dt);

        self.map_channels(|input, output| {
            let mut last_out = input[0];
            output.push(last_out);
            for i in 1..input.len() {
                last_out = alpha * (last_out + input[i] - input[i - 1]);
                output.push(last_out);
            }
        })
    }

    /// 从位置 0 开始叠加 `other`，输出长度与 `self` 相同
    ///
    /// `other` 先转换到 `self` 的格式；超出部分丢弃，结果钳位到 [-1, 1]。
    pub fn overlay(&self, other: &AudioBuffer) -> AudioBuffer {
        let other = if other.sample_rate() != self.sample_rate() || other.channels() != self.channels() {
            other.converted(self.sample_rate(), self.channels())
        } else {
            other.clone()
        };

        let mut samples = self.samples().to_vec();
        for (dst, src) in samples.iter_mut().zip(other.samples()) {
            *dst = (*dst + src).clamp(-1.0, 1.0);
        }
        AudioBuffer::new(samples, self.sample_rate(), self.channels())
    }

    /// 首尾相接重复直到覆盖 `frames` 帧，再精确截断到 `frames`
    pub fn loop_to_frames(&self, frames: usize) -> AudioBuffer {
        if self.is_empty() {
            return AudioBuffer::silent(frames, self.sample_rate(), self.channels());
        }
        if self.frames() >= frames {
            return self.take_frames(frames);
        }

        let repeats = frames.div_ceil(self.frames());
        tracing::debug!(
            source_frames = self.frames(),
            target_frames = frames,
            repeats,
            "Looping audio"
        );

        let mut samples = Vec::with_capacity(repeats * self.samples().len());
        for _ in 0..repeats {
            samples.extend_from_slice(self.samples());
        }
        AudioBuffer::new(samples, self.sample_rate(), self.channels()).take_frames(frames)
    }

    /// 对每个声道独立运行 `f`，再交错回去
    fn map_channels<F>(&self, mut f: F) -> AudioBuffer
    where
        F: FnMut(&[f32], &mut Vec<f32>),
    {
        if self.is_empty() {
            return self.clone();
        }
        let planar = self
            .to_planar()
            .into_iter()
            .map(|channel| {
                let mut out = Vec::with_capacity(channel.len());
                f(&channel, &mut out);
                out
            })
            .collect();
        AudioBuffer::from_planar(planar, self.sample_rate())
    }
}
