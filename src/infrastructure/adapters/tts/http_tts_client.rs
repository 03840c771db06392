//! HTTP TTS Client - 调用在线语音合成服务
//!
//! 实现 TtsEnginePort trait，通过 Google Translate 的 TTS 接口合成语音
//!
//! 外部 TTS API:
//! GET {base_url}/translate_tts?ie=UTF-8&client=tw-ob&tl={lang}&q={text}&total=..&idx=..&textlen=..
//! Response: audio/mpeg binary
//!
//! 单次请求的文本长度有限制，长文本先分段，各段 MP3 按顺序直接拼接。

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{
    AudioFormat, SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError,
};
use crate::domain::{segment_text, SegmentConfig, DEFAULT_MAX_CHARS};

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 重试次数
    pub max_retries: u32,
    /// 单次请求最大字符数
    pub max_chunk_chars: usize,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.google.com".to_string(),
            timeout_secs: 30,
            max_retries: 0,
            max_chunk_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("storyvox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn synthesize_url(&self) -> String {
        format!("{}/translate_tts", self.config.base_url.trim_end_matches('/'))
    }

    /// 单段请求的查询参数
    fn query_params(chunk: &str, lang: &str, idx: usize, total: usize) -> Vec<(&'static str, String)> {
        vec![
            ("ie", "UTF-8".to_string()),
            ("client", "tw-ob".to_string()),
            ("tl", lang.to_string()),
            ("q", chunk.to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", chunk.chars().count().to_string()),
        ]
    }

    /// 合成单段文本，按配置重试
    async fn fetch_chunk(
        &self,
        chunk: &str,
        lang: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, TtsError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(chunk, lang, idx, total).await {
                Ok(data) => return Ok(data),
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(idx, attempt, error = %e, "TTS request failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        chunk: &str,
        lang: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, TtsError> {
        let response = self
            .client
            .get(self.synthesize_url())
            .query(&Self::query_params(chunk, lang, idx, total))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("Empty audio response".to_string()));
        }

        Ok(audio_data)
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        let chunks = segment_text(
            &request.text,
            &SegmentConfig {
                max_chars: self.config.max_chunk_chars,
            },
        );
        if chunks.is_empty() {
            return Err(TtsError::EmptyText);
        }

        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = request.text.len(),
            chunks = chunks.len(),
            lang = %request.lang,
            "Sending TTS requests"
        );

        let total = chunks.len();
        let mut audio_data = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let data = self.fetch_chunk(chunk, &request.lang, idx, total).await?;
            audio_data.extend_from_slice(&data);
        }

        tracing::info!(
            chunks = total,
            audio_size = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(SynthesisResponse {
            audio_data,
            format: AudioFormat::Mp3,
            chunks: total,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(&self.config.base_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => !response.status().is_server_error(),
            Err(_) => false,
        }
    }
}
