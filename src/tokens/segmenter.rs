//! 分词 / 词对齐服务客户端

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::token::{tokens_from_words, Token};
use crate::translation::error::{TranslationError, TranslationResult};

/// 默认分词服务地址
pub const DEFAULT_SEGMENTER_URL: &str = "http://127.0.0.1:8000";

/// 分词能力
#[async_trait]
pub trait WordSegmenter: Send + Sync {
    async fn segment(&self, text: &str) -> TranslationResult<Vec<Token>>;

    /// 源句与译句的词对齐，返回 `(源词下标, 译词下标)`
    async fn align(
        &self,
        source_sentence: &[String],
        target_sentence: &[String],
    ) -> TranslationResult<Vec<(usize, usize)>>;
}

#[derive(Serialize)]
struct SegmentRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SegmentResponse {
    segmentation: Vec<String>,
}

#[derive(Serialize)]
struct AlignRequest<'a> {
    source_sentence: &'a [String],
    target_sentence: &'a [String],
}

#[derive(Deserialize)]
struct AlignResponse {
    alignment: Vec<(usize, usize)>,
}

/// HTTP 分词服务
#[derive(Debug, Clone)]
pub struct HttpSegmenter {
    client: Client,
    base_url: String,
}

impl HttpSegmenter {
    pub fn new(base_url: &str) -> TranslationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> TranslationResult<R> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::NetworkError(format!(
                "{} 返回状态 {}",
                path,
                status.as_u16()
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl WordSegmenter for HttpSegmenter {
    async fn segment(&self, text: &str) -> TranslationResult<Vec<Token>> {
        let response: SegmentResponse = self.post("/segment", &SegmentRequest { text }).await?;
        Ok(tokens_from_words(text, &response.segmentation))
    }

    async fn align(
        &self,
        source_sentence: &[String],
        target_sentence: &[String],
    ) -> TranslationResult<Vec<(usize, usize)>> {
        let request = AlignRequest {
            source_sentence,
            target_sentence,
        };
        let response: AlignResponse = self.post("/align", &request).await?;
        Ok(response.alignment)
    }
}
