//! 文本分割器
//!
//! 合成服务对单次请求的文本长度有限制，正文需要先切成不超过
//! `max_chars` 个字符的片段，再逐段合成并按顺序拼接。

/// 默认单段最大字符数
pub const DEFAULT_MAX_CHARS: usize = 100;

/// 文本分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 单段最大字符数
    pub max_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// 检查是否为强分隔符（句末标点）
#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!' | '\n')
}

/// 检查是否为弱分隔符（逗号等）
#[inline]
fn is_weak_delimiter(ch: char) -> bool {
    matches!(ch, '，' | '；' | '：' | ',' | ';' | ':' | '…' | '—')
}

/// 按标点切成最小单位（分隔符保留在前一段末尾）
fn split_by_delimiters(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if is_strong_delimiter(ch) || is_weak_delimiter(ch) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                pieces.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }

    pieces
}

/// 超长片段先按空白切分，单词仍超长时按字符硬切
fn split_oversized(piece: &str, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for word in piece.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_chars) {
                parts.push(chunk.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current.chars().count() + needed > max_chars {
            parts.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

/// 合并时的连接符：拉丁文字之间补一个空格，CJK 标点后直接相连
fn joiner(buffer: &str) -> &'static str {
    match buffer.chars().last() {
        Some(c) if c.is_ascii() => " ",
        _ => "",
    }
}

/// 对文本进行分段
///
/// 分段策略：
/// 1. 按句末标点和逗号类标点切成最小单位
/// 2. 超过 `max_chars` 的单位按空白/字符再切
/// 3. 相邻单位在不超过 `max_chars` 的前提下合并
pub fn segment_text(text: &str, config: &SegmentConfig) -> Vec<String> {
    let max_chars = config.max_chars.max(1);
    let mut segments: Vec<String> = Vec::new();
    let mut buffer = String::new();

    let units = split_by_delimiters(text)
        .into_iter()
        .flat_map(|piece| {
            if piece.chars().count() > max_chars {
                split_oversized(&piece, max_chars)
            } else {
                vec![piece]
            }
        });

    for unit in units {
        let sep = joiner(&buffer);
        let joined_len = buffer.chars().count() + sep.len() + unit.chars().count();

        if joined_len > max_chars && !buffer.is_empty() {
            segments.push(std::mem::take(&mut buffer));
        }
        buffer.push_str(joiner(&buffer));
        buffer.push_str(&unit);
    }

    if !buffer.is_empty() {
        segments.push(buffer);
    }

    segments
}

/// 使用默认配置分段（便捷方法）
pub fn segment_text_default(text: &str) -> Vec<String> {
    segment_text(text, &SegmentConfig::default())
}
