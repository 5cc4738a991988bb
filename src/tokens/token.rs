//! 分词结果与最长匹配归约

use serde::{Deserialize, Serialize};

/// 分词单元，`start`/`end` 为字符偏移（左闭右开）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(word: &str, start: usize, end: usize) -> Self {
        Self {
            word: word.to_string(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 最长匹配、互不重叠的归约
///
/// 按起点升序、终点降序排序后贪心接受：起点不小于当前终点的才保留。
pub fn longest_match(tokens: &[Token]) -> Vec<Token> {
    let mut sorted = tokens.to_vec();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut current_end = 0;
    let mut result = Vec::new();
    for token in sorted {
        if token.start >= current_end {
            current_end = token.end;
            result.push(token);
        }
    }
    result
}

/// 在原文中顺序定位分词结果，得到带字符偏移的 [`Token`]
///
/// 找不到的词会被跳过并记录警告。
pub fn tokens_from_words<S: AsRef<str>>(text: &str, words: &[S]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(words.len());
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for word in words {
        let word = word.as_ref();
        if word.is_empty() {
            continue;
        }

        let Some(found) = text[byte_cursor..].find(word) else {
            tracing::warn!("分词结果 {:?} 不在原文中，已跳过", word);
            continue;
        };

        let start = char_cursor + text[byte_cursor..byte_cursor + found].chars().count();
        let end = start + word.chars().count();
        tokens.push(Token::new(word, start, end));

        byte_cursor += found + word.len();
        char_cursor = end;
    }

    tokens
}
