//! Storyvox - 故事朗读 MP3 生成服务
//!
//! 分层结构:
//! - Domain: audio/, story/ (Bounded Contexts), settings
//! - Application: commands, queries, ports
//! - Infrastructure: http, adapters

use std::sync::Arc;

use storyvox::application::{EncodeConfig, PipelineOptions, TtsEnginePort};
use storyvox::config::{load_config, print_config, AppConfig, TtsEngineKind};
use storyvox::infrastructure::adapters::{
    FakeTtsClient, FakeTtsClientConfig, FileOutputStorage, HttpTtsClient, HttpTtsClientConfig,
    SymphoniaLameCodec,
};
use storyvox::infrastructure::http::{AppState, HttpServer, ServerConfig};

/// 初始化日志（RUST_LOG 优先）
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},storyvox={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置创建合成引擎
fn create_tts_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    let engine: Arc<dyn TtsEnginePort> = match config.tts.engine {
        TtsEngineKind::Http => {
            let tts_config = HttpTtsClientConfig {
                base_url: config.tts.url.clone(),
                timeout_secs: config.tts.timeout_secs,
                max_retries: config.tts.max_retries,
                max_chunk_chars: config.tts.max_chunk_chars,
            };
            Arc::new(HttpTtsClient::new(tts_config)?)
        }
        TtsEngineKind::Fake => {
            let tts_config = FakeTtsClientConfig {
                audio_file_path: config.tts.fake_audio_file.clone(),
                ..Default::default()
            };
            Arc::new(FakeTtsClient::new(tts_config)?)
        }
    };
    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Storyvox - story to MP3 service");
    print_config(&config);

    if let Some(temp_dir) = &config.storage.temp_dir {
        tokio::fs::create_dir_all(temp_dir).await?;
    }

    let tts_engine = create_tts_engine(&config)?;
    let codec = Arc::new(SymphoniaLameCodec::new());
    let storage = Arc::new(FileOutputStorage::new(&config.storage.output_dir).await?);

    let options = PipelineOptions {
        lang: config.tts.lang.clone(),
        encode: EncodeConfig {
            bitrate_kbps: config.audio.bitrate_kbps,
        },
        temp_root: config.storage.temp_dir.clone(),
    };

    let state = AppState::new(
        tts_engine,
        codec,
        storage,
        options,
        config.server.public_base_url(),
    )
    .with_default_music_volume(config.audio.default_music_volume_db);

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_static_files(&config.server.static_files)
        .with_max_body_bytes(config.storage.max_upload_size as usize);

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
