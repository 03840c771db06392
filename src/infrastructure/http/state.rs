//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    BatchCreateStoryAudioHandler, CreateStoryAudioHandler, StoryAudioPipeline,
    // Query handlers
    GetOutputAudioHandler,
    // Ports
    AudioCodecPort, OutputStoragePort, PipelineOptions, TtsEnginePort,
};
use crate::domain::audio::DEFAULT_MUSIC_VOLUME_DB;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub tts_engine: Arc<dyn TtsEnginePort>,

    /// 对外访问的基础 URL，用于拼接播放地址
    pub base_url: String,

    /// 表单未提交背景音量时使用的值（dB）
    pub default_music_volume_db: f32,

    // ========== Command Handlers ==========
    pub create_story_handler: CreateStoryAudioHandler,
    pub batch_story_handler: BatchCreateStoryAudioHandler,

    // ========== Query Handlers ==========
    pub get_output_audio_handler: GetOutputAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        tts_engine: Arc<dyn TtsEnginePort>,
        codec: Arc<dyn AudioCodecPort>,
        storage: Arc<dyn OutputStoragePort>,
        options: PipelineOptions,
        base_url: impl Into<String>,
    ) -> Self {
        let pipeline = Arc::new(StoryAudioPipeline::new(
            tts_engine.clone(),
            codec,
            storage.clone(),
            options,
        ));

        Self {
            tts_engine,
            base_url: base_url.into(),
            default_music_volume_db: DEFAULT_MUSIC_VOLUME_DB,

            // Command handlers
            create_story_handler: CreateStoryAudioHandler::new(pipeline.clone()),
            batch_story_handler: BatchCreateStoryAudioHandler::new(pipeline),

            // Query handlers
            get_output_audio_handler: GetOutputAudioHandler::new(storage),
        }
    }

    pub fn with_default_music_volume(mut self, db: f32) -> Self {
        self.default_music_volume_db = db;
        self
    }
}
