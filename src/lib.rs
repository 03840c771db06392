//! Storyvox - 故事文本转 MP3 有声故事
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Audio Context: 音频缓冲、增强、变速、背景混音
//! - Story Context: 故事、标题与批处理
//! - Settings: 请求级合成参数
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, AudioCodec, OutputStorage）
//! - Commands: 单条/批量生成
//! - Queries: 成品音频读取
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 静态表单页面
//! - Adapters: TTS Client, symphonia/LAME 编解码, 文件存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
