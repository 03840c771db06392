//! Story Command Handlers - 合成编排
//!
//! 合成 → 写入临时原始文件 → 解码 → 增强 → 变速 → 混音 → 导出 MP3 → 删除原始文件

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::commands::{
    BackgroundMusic, BatchCreateStoryAudio, BatchStoryAudio, CreateStoryAudio, StoryAudio,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioCodecPort, AudioFormat, EncodeConfig, OutputStoragePort, SynthesisRequest, TtsEnginePort,
};
use crate::domain::audio::{AudioEnhancer, BackgroundMixer, TimeStretcher};
use crate::domain::story::{numbered_output_file_name, Story, StoryError, StoryTitle};
use crate::domain::SynthesisSettings;

/// 原始合成音频在临时目录中的文件名（不含扩展名）
const RAW_VOICE_STEM: &str = "voice_raw";
/// 背景音乐在临时目录中的文件名（不含扩展名）
const BACKGROUND_STEM: &str = "background";

/// 编排参数
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// 合成语言
    pub lang: String,
    /// MP3 导出配置
    pub encode: EncodeConfig,
    /// 请求级临时目录的父目录，None 使用系统临时目录
    pub temp_root: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            encode: EncodeConfig::default(),
            temp_root: None,
        }
    }
}

/// 单个故事的完整处理流程，单条与批量共用
pub struct StoryAudioPipeline {
    tts_engine: Arc<dyn TtsEnginePort>,
    codec: Arc<dyn AudioCodecPort>,
    storage: Arc<dyn OutputStoragePort>,
    options: PipelineOptions,
}

impl StoryAudioPipeline {
    pub fn new(
        tts_engine: Arc<dyn TtsEnginePort>,
        codec: Arc<dyn AudioCodecPort>,
        storage: Arc<dyn OutputStoragePort>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            tts_engine,
            codec,
            storage,
            options,
        }
    }

    /// 创建请求级临时目录，drop 时自动删除
    fn workspace(&self) -> Result<TempDir, ApplicationError> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("storyvox-");
            builder
        };
        let dir = match &self.options.temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// 在给定工作目录中处理一个故事
    async fn render(
        &self,
        story: &Story,
        background: Option<&Path>,
        settings: SynthesisSettings,
        workspace: &Path,
    ) -> Result<StoryAudio, ApplicationError> {
        if story.is_blank() {
            return Err(ApplicationError::EmptyText);
        }

        tracing::info!(
            title = %story.title(),
            text_len = story.text().len(),
            speed = settings.speed(),
            has_background = background.is_some(),
            "Generating story audio"
        );

        // 1. 合成
        let response = self
            .tts_engine
            .synthesize(SynthesisRequest {
                text: story.text().to_string(),
                lang: self.options.lang.clone(),
            })
            .await?;

        let raw_path = workspace.join(format!("{}.{}", RAW_VOICE_STEM, response.format));
        tokio::fs::write(&raw_path, &response.audio_data).await?;

        tracing::debug!(
            path = %raw_path.display(),
            size = response.audio_data.len(),
            chunks = response.chunks,
            "Raw voice written"
        );

        // 2. 解码 + 增强 + 变速 + 混音 + 编码（阻塞）
        let voice_data = tokio::fs::read(&raw_path).await?;
        let voice_format = response.format;
        let music = match background {
            Some(path) => Some(BackgroundMusic::from_file(path).await?),
            None => None,
        };

        if music.is_some() {
            // 表单上的音量只做记录，混音使用默认偏移
            tracing::debug!(
                requested_music_volume_db = settings.music_volume_db(),
                applied_music_volume_db = BackgroundMixer::default().volume_db(),
                "Background music volume"
            );
        }

        let codec = self.codec.clone();
        let encode = self.options.encode.clone();
        let speed = settings.speed();

        let (mp3, duration_ms) = tokio::task::spawn_blocking(move || {
            process_voice(codec.as_ref(), &voice_data, voice_format, music, speed, &encode)
        })
        .await
        .map_err(|e| ApplicationError::internal(format!("Audio task failed: {}", e)))??;

        // 3. 导出
        let file_name = self
            .unique_output_name(story.title(), Local::now().naive_local())
            .await;
        let output_path = self.storage.save_output(&file_name, &mp3).await?;

        // 4. 清理原始文件
        if let Err(e) = tokio::fs::remove_file(&raw_path).await {
            tracing::warn!("Failed to delete raw voice file: {}", e);
        }

        tracing::info!(
            title = %story.title(),
            file_name = %file_name,
            duration_ms,
            size = mp3.len(),
            "Story audio generated"
        );

        Ok(StoryAudio {
            title: story.title().to_string(),
            file_name,
            output_path,
            duration_ms,
            size_bytes: mp3.len(),
        })
    }

    /// 不与已有成品重名的输出文件名
    ///
    /// 不同标题可能清理成同一文件名，同一秒内完成时追加序号。
    async fn unique_output_name(&self, title: &StoryTitle, timestamp: NaiveDateTime) -> String {
        let mut sequence = 1;
        loop {
            let file_name = numbered_output_file_name(title, timestamp, sequence);
            if !self.storage.output_exists(&file_name).await {
                return file_name;
            }
            sequence += 1;
        }
    }

    /// 把背景音乐写入工作目录，返回其路径
    async fn stage_background(
        &self,
        background: Option<&BackgroundMusic>,
        workspace: &Path,
    ) -> Result<Option<PathBuf>, ApplicationError> {
        let Some(music) = background else {
            return Ok(None);
        };
        let ext = music.format.unwrap_or(AudioFormat::Mp3);
        let path = workspace.join(format!("{}.{}", BACKGROUND_STEM, ext));
        tokio::fs::write(&path, &music.data).await?;
        Ok(Some(path))
    }
}

/// 音频处理的阻塞部分
fn process_voice(
    codec: &dyn AudioCodecPort,
    voice_data: &[u8],
    voice_format: AudioFormat,
    music: Option<BackgroundMusic>,
    speed: f32,
    encode: &EncodeConfig,
) -> Result<(Vec<u8>, u64), ApplicationError> {
    let voice = codec.decode(voice_data, Some(voice_format))?;
    let mut audio = AudioEnhancer::new().enhance(&voice);

    let stretcher = TimeStretcher::new(speed);
    if !stretcher.is_identity() {
        audio = stretcher.stretch(&audio);
    }

    if let Some(music) = music {
        let track = codec.decode(&music.data, music.format)?;
        audio = BackgroundMixer::default().mix(&audio, &track);
    }

    let duration_ms = audio.duration_ms();
    let mp3 = codec.encode_mp3(&audio, encode)?;
    Ok((mp3, duration_ms))
}

// ============================================================================
// CreateStoryAudio
// ============================================================================

/// CreateStoryAudio Handler
pub struct CreateStoryAudioHandler {
    pipeline: Arc<StoryAudioPipeline>,
}

impl CreateStoryAudioHandler {
    pub fn new(pipeline: Arc<StoryAudioPipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn handle(&self, command: CreateStoryAudio) -> Result<StoryAudio, ApplicationError> {
        if command.story.is_blank() {
            return Err(ApplicationError::EmptyText);
        }

        let span = tracing::info_span!("story_request", request_id = %Uuid::new_v4());
        self.run(command).instrument(span).await
    }

    async fn run(&self, command: CreateStoryAudio) -> Result<StoryAudio, ApplicationError> {
        let workspace = self.pipeline.workspace()?;
        let background = self
            .pipeline
            .stage_background(command.background.as_ref(), workspace.path())
            .await?;

        self.pipeline
            .render(
                &command.story,
                background.as_deref(),
                command.settings,
                workspace.path(),
            )
            .await
    }
}

// ============================================================================
// BatchCreateStoryAudio
// ============================================================================

/// BatchCreateStoryAudio Handler
pub struct BatchCreateStoryAudioHandler {
    pipeline: Arc<StoryAudioPipeline>,
}

impl BatchCreateStoryAudioHandler {
    pub fn new(pipeline: Arc<StoryAudioPipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn handle(
        &self,
        command: BatchCreateStoryAudio,
    ) -> Result<BatchStoryAudio, ApplicationError> {
        if command.batch.is_empty() {
            return Err(StoryError::EmptyBatch.into());
        }

        let span = tracing::info_span!("batch_request", request_id = %Uuid::new_v4());
        self.run_batch(command).instrument(span).await
    }

    async fn run_batch(
        &self,
        command: BatchCreateStoryAudio,
    ) -> Result<BatchStoryAudio, ApplicationError> {
        let workspace = self.pipeline.workspace()?;
        let background = self
            .pipeline
            .stage_background(command.background.as_ref(), workspace.path())
            .await?;

        let total = command.batch.len();
        let mut result = BatchStoryAudio::default();

        for (index, story) in command.batch.into_iter().enumerate() {
            let audio = self
                .pipeline
                .render(&story, background.as_deref(), command.settings, workspace.path())
                .await
                .map_err(|e| {
                    tracing::error!(
                        title = %story.title(),
                        index,
                        total,
                        completed = result.outputs.len(),
                        error = %e,
                        "Batch aborted"
                    );
                    e
                })?;
            result.outputs.insert(story.title().to_string(), audio);
        }

        tracing::info!(count = result.outputs.len(), "Batch completed");

        Ok(result)
    }
}
