//! Fake TTS Client - 用于测试的 TTS 客户端
//!
//! 不实际调用合成服务：配置了音频文件时始终返回该文件，
//! 否则按文本长度生成一段 WAV 提示音。

use async_trait::async_trait;
use std::path::PathBuf;

use crate::application::ports::{
    AudioFormat, SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError,
};
use crate::domain::audio::AudioBuffer;
use crate::infrastructure::adapters::codec::encode_wav;

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 固定返回的音频文件路径（MP3/WAV）
    pub audio_file_path: Option<PathBuf>,
    /// 生成提示音时每个字符对应的时长（毫秒）
    pub ms_per_char: u64,
    /// 生成提示音的采样率
    pub sample_rate: u32,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            audio_file_path: None,
            ms_per_char: 60,
            sample_rate: 24000,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    /// 缓存的音频数据
    fixed_audio: Option<(Vec<u8>, AudioFormat)>,
}

impl FakeTtsClient {
    /// 创建新的 FakeTtsClient
    pub fn new(config: FakeTtsClientConfig) -> Result<Self, std::io::Error> {
        let fixed_audio = match &config.audio_file_path {
            Some(path) => {
                let data = std::fs::read(path)?;
                let format = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(AudioFormat::from_extension)
                    .unwrap_or(AudioFormat::Mp3);
                Some((data, format))
            }
            None => None,
        };

        tracing::info!(
            path = ?config.audio_file_path,
            ms_per_char = config.ms_per_char,
            "FakeTtsClient initialized"
        );

        Ok(Self {
            config,
            fixed_audio,
        })
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self {
            config: FakeTtsClientConfig::default(),
            fixed_audio: None,
        }
    }

    /// 按文本长度生成 440Hz 提示音
    fn tone_for(&self, text: &str) -> Vec<u8> {
        let rate = self.config.sample_rate;
        let duration_ms = text.chars().count() as u64 * self.config.ms_per_char;
        let frames = (duration_ms * rate as u64 / 1000) as usize;
        let samples = (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin() * 0.3)
            .collect();
        encode_wav(&AudioBuffer::new(samples, rate, 1))
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        if request.text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        tracing::debug!(
            text_len = request.text.len(),
            lang = %request.lang,
            "FakeTtsClient: returning canned audio"
        );

        let (audio_data, format) = match &self.fixed_audio {
            Some((data, format)) => (data.clone(), *format),
            None => (self.tone_for(&request.text), AudioFormat::Wav),
        };

        Ok(SynthesisResponse {
            audio_data,
            format,
            chunks: 1,
        })
    }
}
