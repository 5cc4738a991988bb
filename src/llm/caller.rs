//! 大模型调用
//!
//! 调用失败时只记录原始原因，对外统一返回通用的 [`TranslationError::ModelError`]。

use std::time::Duration;

use reqwest::Client;

use super::api::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::UserConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 对外暴露的通用失败消息
pub const GENERIC_FAILURE: &str = "Failed to get a response from the large language model.";

/// 模型返回空内容时的占位结果
pub const EMPTY_RESPONSE: &str = "Error: Model returned an empty response.";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// 调用参数
#[derive(Debug, Clone, Default)]
pub struct LlmCallerConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub system_prompt: String,
}

impl LlmCallerConfig {
    pub fn from_user_config(config: &UserConfig, system_prompt: &str) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.resolved_base_url(),
            model: config.model.clone(),
            system_prompt: system_prompt.to_string(),
        }
    }
}

/// OpenAI 兼容接口调用器
#[derive(Debug, Clone)]
pub struct LlmCaller {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    system_prompt: String,
}

impl LlmCaller {
    pub fn new(config: LlmCallerConfig) -> TranslationResult<Self> {
        let base_url = config
            .base_url
            .ok_or_else(|| TranslationError::ConfigError("未配置模型服务地址".to_string()))?;

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: config.api_key,
            model: config.model,
            system_prompt: config.system_prompt,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 使用构造时给定的系统提示词
    pub async fn call(&self, user_prompt: &str) -> TranslationResult<String> {
        self.call_with(&self.system_prompt, user_prompt).await
    }

    /// 指定系统提示词调用
    pub async fn call_with(&self, system_prompt: &str, user_prompt: &str) -> TranslationResult<String> {
        match self.request(system_prompt, user_prompt).await {
            Ok(Some(text)) => Ok(text),
            Ok(None) => {
                tracing::warn!("模型 {} 返回空内容", self.model);
                Ok(EMPTY_RESPONSE.to_string())
            }
            Err(e) => {
                tracing::error!("大模型调用失败: {}", e);
                Err(TranslationError::ModelError(GENERIC_FAILURE.to_string()))
            }
        }
    }

    async fn request(&self, system_prompt: &str, user_prompt: &str) -> TranslationResult<Option<String>> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::NetworkError(format!(
                "{} {}",
                status.as_u16(),
                truncate(&body, 320)
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TranslationError::ParseError("响应中没有 choices".to_string()))?;

        Ok(choice.message.content)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
