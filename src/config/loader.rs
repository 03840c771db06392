//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, TtsEngineKind};
use crate::domain::settings::{MAX_MUSIC_VOLUME_DB, MIN_MUSIC_VOLUME_DB};
use crate::infrastructure::adapters::is_supported_bitrate;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `STORYVOX_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `STORYVOX_SERVER__PORT=8080`
/// - `STORYVOX_TTS__LANG=fr`
/// - `STORYVOX_TTS__ENGINE=fake`
/// - `STORYVOX_STORAGE__OUTPUT_DIR=/data/stories`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("server.static_files", "web")?
        .set_default("tts.engine", "http")?
        .set_default("tts.url", "https://translate.google.com")?
        .set_default("tts.lang", "en")?
        .set_default("tts.timeout_secs", 30)?
        .set_default("tts.max_retries", 0)?
        .set_default("tts.max_chunk_chars", 100)?
        .set_default("audio.bitrate_kbps", 192)?
        .set_default("audio.default_music_volume_db", -20.0)?
        .set_default("storage.output_dir", "data/output")?
        .set_default("storage.max_upload_size", 50 * 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），例如 STORYVOX_TTS__URL=http://tts:8000
    builder = builder.add_source(
        Environment::with_prefix("STORYVOX")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.engine == TtsEngineKind::Http && config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.tts.lang.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS language cannot be empty".to_string(),
        ));
    }

    if config.tts.max_chunk_chars == 0 {
        return Err(ConfigError::ValidationError(
            "TTS chunk size cannot be 0".to_string(),
        ));
    }

    if !is_supported_bitrate(config.audio.bitrate_kbps) {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported MP3 bitrate: {} kbps",
            config.audio.bitrate_kbps
        )));
    }

    let volume = config.audio.default_music_volume_db;
    if !(MIN_MUSIC_VOLUME_DB..=MAX_MUSIC_VOLUME_DB).contains(&volume) {
        return Err(ConfigError::ValidationError(format!(
            "Default music volume out of range: {} dB",
            volume
        )));
    }

    if config.storage.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Static Files: {:?}", config.server.static_files);
    tracing::info!("TTS Engine: {:?}", config.tts.engine);
    if config.tts.engine == TtsEngineKind::Http {
        tracing::info!("TTS URL: {}", config.tts.url);
        tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
        tracing::info!("TTS Retries: {}", config.tts.max_retries);
    }
    tracing::info!("TTS Language: {}", config.tts.lang);
    tracing::info!("MP3 Bitrate: {} kbps", config.audio.bitrate_kbps);
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Max Upload Size: {} bytes", config.storage.max_upload_size);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_tts_url() {
        let mut config = AppConfig::default();
        config.tts.url = String::new();
        assert!(validate_config(&config).is_err());

        // fake 引擎不需要 URL
        config.tts.engine = TtsEngineKind::Fake;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_bitrate() {
        let mut config = AppConfig::default();
        config.audio.bitrate_kbps = 100;
        assert!(validate_config(&config).is_err());
        config.audio.bitrate_kbps = 128;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_music_volume() {
        let mut config = AppConfig::default();
        config.audio.default_music_volume_db = 3.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8088\n\n[tts]\nengine = \"fake\"\nlang = \"fr\"\n\n[audio]\nbitrate_kbps = 128"
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.tts.engine, TtsEngineKind::Fake);
        assert_eq!(config.tts.lang, "fr");
        assert_eq!(config.audio.bitrate_kbps, 128);
        // 未出现的字段保持默认值
        assert_eq!(config.tts.max_chunk_chars, 100);
        assert_eq!(config.storage.output_dir, std::path::PathBuf::from("data/output"));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[audio]\nbitrate_kbps = 193").unwrap();
        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
