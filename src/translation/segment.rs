//! 长文本分段
//!
//! 翻译接口对单次输入有长度限制。超长文本优先在句末标点（`.` `?` `!`
//! 后接空白或到达末尾）处切开，找不到句界时硬切。长度一律按字符计。

use std::sync::OnceLock;

use regex::Regex;

fn sentence_boundary() -> Option<&'static Regex> {
    static BOUNDARY: OnceLock<Option<Regex>> = OnceLock::new();
    BOUNDARY
        .get_or_init(|| Regex::new(r"[.?!](?:\s|$)").ok())
        .as_ref()
}

/// 把 `text` 切成每段不超过 `max_chars` 个字符的片段
///
/// 每个切点紧跟在句末标点及其后的空白之后；后续片段去掉开头空白。
/// `max_chars` 为 0 时按 1 处理。
pub fn segment_long_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut segments = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        if rest.chars().count() <= max_chars {
            segments.push(rest.to_string());
            break;
        }

        let limit = byte_offset(rest, max_chars);
        let candidate = &rest[..limit];

        let split = match last_boundary(candidate) {
            Some(after_punct) => skip_spaces(rest, after_punct, limit),
            None => {
                tracing::warn!("未找到句子边界，在第 {} 个字符处硬切", max_chars);
                limit
            }
        };

        segments.push(rest[..split].to_string());
        rest = rest[split..].trim_start();
    }

    segments
}

/// 候选片段中最后一个句界，返回标点之后的字节位置
fn last_boundary(candidate: &str) -> Option<usize> {
    sentence_boundary()?
        .find_iter(candidate)
        .filter(|m| m.start() > 0)
        .last()
        .map(|m| m.start() + 1)
}

/// 越过标点后的空白，但不超过 `limit`
fn skip_spaces(text: &str, mut pos: usize, limit: usize) -> usize {
    for ch in text[pos..limit].chars() {
        if !ch.is_whitespace() {
            break;
        }
        pos += ch.len_utf8();
    }
    pos
}

/// 第 `chars` 个字符所在的字节偏移
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
