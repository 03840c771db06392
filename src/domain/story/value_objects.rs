//! Story Context - Value Objects

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::StoryError;

/// 表单未填写标题时使用的默认标题
pub const DEFAULT_TITLE: &str = "My Story";

/// 输出文件名中的时间戳格式（秒级精度）
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 故事标题
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoryTitle(String);

impl StoryTitle {
    pub fn new(title: impl Into<String>) -> Result<Self, StoryError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoryError::InvalidTitle("标题不能为空".to_string()));
        }
        if title.chars().count() > 200 {
            return Err(StoryError::InvalidTitle("标题长度不能超过200字符".to_string()));
        }
        Ok(Self(title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 可安全用于文件名的形式
    ///
    /// 路径分隔符、控制字符和 Windows 保留字符替换为 `_`。
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .0
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        // "." 和 ".." 不能作为文件名
        if stem.chars().all(|c| c == '.') {
            stem.replace('.', "_")
        } else {
            stem
        }
    }
}

impl std::fmt::Display for StoryTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 输出文件名：`<title>_<YYYYMMDD_HHMMSS>.mp3`
///
/// 同一秒内同一标题会得到相同的文件名。
pub fn output_file_name(title: &StoryTitle, timestamp: NaiveDateTime) -> String {
    format!("{}_{}.mp3", title.file_stem(), timestamp.format(TIMESTAMP_FORMAT))
}

/// 带序号的输出文件名，目标已存在时使用：`<title>_<YYYYMMDD_HHMMSS>_<n>.mp3`
///
/// `sequence <= 1` 与 [`output_file_name`] 相同。
pub fn numbered_output_file_name(
    title: &StoryTitle,
    timestamp: NaiveDateTime,
    sequence: u32,
) -> String {
    if sequence <= 1 {
        return output_file_name(title, timestamp);
    }
    format!(
        "{}_{}_{}.mp3",
        title.file_stem(),
        timestamp.format(TIMESTAMP_FORMAT),
        sequence
    )
}

/// 故事记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    title: StoryTitle,
    text: String,
}

impl Story {
    pub fn new(title: StoryTitle, text: impl Into<String>) -> Self {
        Self {
            title,
            text: text.into(),
        }
    }

    pub fn title(&self) -> &StoryTitle {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 正文是否为空（仅含空白也算空）
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 批处理输入：标题 → 正文，标题唯一，保持提交顺序
#[derive(Debug, Clone, Default)]
pub struct StoryBatch {
    stories: Vec<Story>,
}

impl StoryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个故事，标题重复时报错
    pub fn insert(&mut self, story: Story) -> Result<(), StoryError> {
        if self.stories.iter().any(|s| s.title == story.title) {
            return Err(StoryError::DuplicateTitle(story.title.to_string()));
        }
        self.stories.push(story);
        Ok(())
    }

    pub fn from_pairs<I, T, S>(pairs: I) -> Result<Self, StoryError>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        let mut batch = Self::new();
        for (title, text) in pairs {
            batch.insert(Story::new(StoryTitle::new(title)?, text))?;
        }
        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter()
    }
}

impl IntoIterator for StoryBatch {
    type Item = Story;
    type IntoIter = std::vec::IntoIter<Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.stories.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_title_validation() {
        assert!(StoryTitle::new("My Story").is_ok());
        assert!(StoryTitle::new("   ").is_err());
        assert!(StoryTitle::new("a".repeat(201)).is_err());
    }

    #[test]
    fn test_file_stem_sanitised() {
        let title = StoryTitle::new("../etc/passwd").unwrap();
        assert_eq!(title.file_stem(), ".._etc_passwd");
        assert!(!title.file_stem().contains('/'));

        let dots = StoryTitle::new("..").unwrap();
        assert_eq!(dots.file_stem(), "__");

        let plain = StoryTitle::new("chapter1.txt").unwrap();
        assert_eq!(plain.file_stem(), "chapter1.txt");
    }

    #[test]
    fn test_output_file_name_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 3)
            .unwrap();
        let title = StoryTitle::new("My Story").unwrap();
        assert_eq!(output_file_name(&title, ts), "My Story_20240309_070503.mp3");
    }

    #[test]
    fn test_numbered_output_file_name() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 3)
            .unwrap();
        let title = StoryTitle::new("a:b.txt").unwrap();
        assert_eq!(
            numbered_output_file_name(&title, ts, 1),
            output_file_name(&title, ts)
        );
        assert_eq!(
            numbered_output_file_name(&title, ts, 2),
            "a_b.txt_20240309_070503_2.mp3"
        );
    }

    #[test]
    fn test_blank_story() {
        let title = StoryTitle::new("t").unwrap();
        assert!(Story::new(title.clone(), "").is_blank());
        assert!(Story::new(title.clone(), " \n\t").is_blank());
        assert!(!Story::new(title, "hello").is_blank());
    }

    #[test]
    fn test_batch_rejects_duplicate_titles() {
        let result = StoryBatch::from_pairs([("A", "hello"), ("A", "again")]);
        assert_eq!(result.unwrap_err(), StoryError::DuplicateTitle("A".to_string()));
    }

    #[test]
    fn test_batch_keeps_order() {
        let batch = StoryBatch::from_pairs([("B", "world"), ("A", "hello")]).unwrap();
        let titles: Vec<_> = batch.iter().map(|s| s.title().as_str().to_string()).collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert_eq!(batch.len(), 2);
    }
}
