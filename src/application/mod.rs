//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、AudioCodec、OutputStorage）
//! - commands: CQRS 命令及处理器（单条/批量生成）
//! - queries: CQRS 查询及处理器（成品音频读取）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    BackgroundMusic, BatchCreateStoryAudio, BatchStoryAudio, CreateStoryAudio, StoryAudio,
    // Handlers
    handlers::{
        BatchCreateStoryAudioHandler, CreateStoryAudioHandler, PipelineOptions, StoryAudioPipeline,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Codec
    AudioCodecPort,
    AudioFormat,
    CodecError,
    EncodeConfig,
    // Output storage
    OutputStorageError,
    OutputStoragePort,
    // TTS engine
    SynthesisRequest,
    SynthesisResponse,
    TtsEnginePort,
    TtsError,
};

pub use queries::{
    handlers::GetOutputAudioHandler, GetOutputAudio, OutputAudioData, OutputAudioInfo,
};
