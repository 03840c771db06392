//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::audio::DEFAULT_MUSIC_VOLUME_DB;
use crate::domain::DEFAULT_MAX_CHARS;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音频导出配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（用于拼接播放地址）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// 表单页面目录
    #[serde(default = "default_static_files")]
    pub static_files: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

fn default_static_files() -> PathBuf {
    PathBuf::from("web")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            static_files: default_static_files(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 合成引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngineKind {
    /// 在线合成服务
    #[default]
    Http,
    /// 离线替身，返回固定音频或提示音
    Fake,
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 引擎类型
    #[serde(default)]
    pub engine: TtsEngineKind,

    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 合成语言
    #[serde(default = "default_tts_lang")]
    pub lang: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,

    /// 单次请求最大字符数
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// fake 引擎返回的固定音频文件，未设置时生成提示音
    #[serde(default)]
    pub fake_audio_file: Option<PathBuf>,
}

fn default_tts_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_tts_lang() -> String {
    "en".to_string()
}

fn default_tts_timeout() -> u64 {
    30
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHARS
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: TtsEngineKind::default(),
            url: default_tts_url(),
            lang: default_tts_lang(),
            timeout_secs: default_tts_timeout(),
            max_retries: 0,
            max_chunk_chars: default_max_chunk_chars(),
            fake_audio_file: None,
        }
    }
}

/// 音频导出配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// MP3 比特率（kbps）
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,

    /// 表单未提交背景音量时使用的值（dB）
    #[serde(default = "default_music_volume_db")]
    pub default_music_volume_db: f32,
}

fn default_bitrate_kbps() -> u32 {
    192
}

fn default_music_volume_db() -> f32 {
    DEFAULT_MUSIC_VOLUME_DB
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: default_bitrate_kbps(),
            default_music_volume_db: default_music_volume_db(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 成品 MP3 输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 请求级临时目录的父目录，未设置时使用系统临时目录
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// 上传文件最大大小（字节），默认 50MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_max_upload_size() -> u64 {
    50 * 1024 * 1024 // 50 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            temp_dir: None,
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5060);
        assert_eq!(config.tts.engine, TtsEngineKind::Http);
        assert_eq!(config.tts.lang, "en");
        assert_eq!(config.tts.max_chunk_chars, 100);
        assert_eq!(config.audio.bitrate_kbps, 192);
        assert_eq!(config.audio.default_music_volume_db, -20.0);
        assert_eq!(config.storage.output_dir, PathBuf::from("data/output"));
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5060");
    }

    #[test]
    fn test_public_base_url() {
        let mut config = ServerConfig::default();
        assert_eq!(config.public_base_url(), "http://localhost:5060");

        config.base_url = Some("https://stories.example.com".to_string());
        assert_eq!(config.public_base_url(), "https://stories.example.com");
    }
}
