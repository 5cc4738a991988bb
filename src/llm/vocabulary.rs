//! 模型词汇输出的宽松解析
//!
//! 模型经常在 JSON 外面包一层 Markdown 代码块，或夹杂说明文字；单个条目
//! 字段缺失时跳过该条目并记录警告，不影响其他条目。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CefrLevel;
use crate::translation::error::{TranslationError, TranslationResult};

/// 一条词汇注释
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub original_text: String,
    pub translation: String,
    #[serde(rename = "CEFR_level", alias = "cefr_level", default)]
    pub cefr_level: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub explanation_translation: String,
}

impl VocabularyEntry {
    pub fn level(&self) -> Option<CefrLevel> {
        self.cefr_level.parse().ok()
    }

    /// 是否处在学习者等级或高一级
    pub fn within_reach(&self, learner: CefrLevel) -> bool {
        match self.level() {
            Some(level) => level == learner || Some(level) == learner.next(),
            None => true,
        }
    }
}

fn code_fence() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").ok())
        .as_ref()
}

/// 去掉代码块并截取最外层的 JSON 数组
fn extract_json_array(response: &str) -> Option<&str> {
    let body = code_fence()
        .and_then(|re| re.captures(response))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(response);

    let start = body.find('[')?;
    let end = body.rfind(']')?;
    (start < end).then(|| &body[start..=end])
}

/// 解析模型返回的词汇列表
pub fn parse_vocabulary(response: &str) -> TranslationResult<Vec<VocabularyEntry>> {
    let json = extract_json_array(response)
        .ok_or_else(|| TranslationError::ParseError("模型输出中没有 JSON 数组".to_string()))?;

    let items: Vec<Value> = serde_json::from_str(json)?;

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<VocabularyEntry>(item) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("跳过第 {} 个词汇条目: {}", index + 1, e),
        }
    }

    Ok(entries)
}
