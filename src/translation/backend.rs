//! 翻译后端
//!
//! [`TranslateBackend`] 只负责“一段文本进、一段译文出”，限速与分段由
//! [`Translator`](super::Translator) 负责。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::translation::error::{TranslationError, TranslationResult};

/// 单段翻译能力
#[async_trait]
pub trait TranslateBackend: Send + Sync {
    async fn fetch_translation(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String>;
}

/// Google 翻译网页端接口（`translate_a/single`）
#[derive(Debug, Clone)]
pub struct GoogleTranslateBackend {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> TranslationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TranslateBackend for GoogleTranslateBackend {
    async fn fetch_translation(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("dt", "at"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::NetworkError(format!(
                "Translation API failed with status: {}",
                status.as_u16()
            )));
        }

        let data: Value = response.json().await?;
        join_segments(&data)
    }
}

/// 拼接 `data[0][*][0]`
fn join_segments(data: &Value) -> TranslationResult<String> {
    let segments = data
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::ParseError("响应缺少译文数组".to_string()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_segments() {
        let data = json!([[["Hello, ", "你好，", null], ["world.", "世界。", null]], null, "zh-CN"]);
        assert_eq!(join_segments(&data).unwrap(), "Hello, world.");
    }

    #[test]
    fn test_join_segments_rejects_bad_shape() {
        let error = join_segments(&json!({"error": "nope"})).unwrap_err();
        assert!(matches!(error, TranslationError::ParseError(_)));
    }
}
