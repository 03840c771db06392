//! Story Commands - 故事音频生成命令

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::application::ports::AudioFormat;
use crate::domain::story::{Story, StoryBatch};
use crate::domain::SynthesisSettings;

/// 背景音乐
#[derive(Debug, Clone)]
pub struct BackgroundMusic {
    /// 编码后的音频数据（MP3/WAV）
    pub data: Vec<u8>,
    /// 已知格式；None 时按内容探测
    pub format: Option<AudioFormat>,
}

impl BackgroundMusic {
    pub fn new(data: Vec<u8>, format: Option<AudioFormat>) -> Self {
        Self { data, format }
    }

    /// 从文件读取，格式取自扩展名
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(AudioFormat::from_extension);
        Ok(Self { data, format })
    }
}

/// 生成单个故事音频命令
#[derive(Debug, Clone)]
pub struct CreateStoryAudio {
    pub story: Story,
    pub background: Option<BackgroundMusic>,
    pub settings: SynthesisSettings,
}

/// 批量生成命令
///
/// 逐个顺序处理，第一个失败即中止，已生成的文件保留在磁盘上
#[derive(Debug, Clone)]
pub struct BatchCreateStoryAudio {
    pub batch: StoryBatch,
    pub background: Option<BackgroundMusic>,
    pub settings: SynthesisSettings,
}

/// 一个已生成的故事音频
#[derive(Debug, Clone)]
pub struct StoryAudio {
    pub title: String,
    pub file_name: String,
    pub output_path: PathBuf,
    pub duration_ms: u64,
    pub size_bytes: usize,
}

/// 批量生成响应：标题 → 生成结果
#[derive(Debug, Clone, Default)]
pub struct BatchStoryAudio {
    pub outputs: BTreeMap<String, StoryAudio>,
}

impl BatchStoryAudio {
    /// 标题 → 输出路径
    pub fn paths(&self) -> BTreeMap<&str, &Path> {
        self.outputs
            .iter()
            .map(|(title, audio)| (title.as_str(), audio.output_path.as_path()))
            .collect()
    }
}
