//! 机器翻译客户端配置

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 默认翻译接口
pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// 两次调用之间的最小间隔
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(200);

/// 单次请求的最大字符数
pub const MAX_SEGMENT_LENGTH: usize = 1000;

pub const DEFAULT_SOURCE_LANG: &str = "auto";
pub const DEFAULT_TARGET_LANG: &str = "en";

/// 翻译客户端配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub api_url: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(with = "millis")]
    pub rate_limit_delay: Duration,
    pub max_segment_length: usize,
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_TRANSLATE_URL.to_string(),
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            rate_limit_delay: RATE_LIMIT_DELAY,
            max_segment_length: MAX_SEGMENT_LENGTH,
            timeout_secs: 30,
        }
    }
}

impl TranslatorConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.max_segment_length == 0 {
            return Err(TranslationError::ConfigError("单段最大长度不能为0".to_string()));
        }

        if url::Url::parse(&self.api_url).is_err() {
            return Err(TranslationError::ConfigError(format!(
                "无效的翻译接口地址: {}",
                self.api_url
            )));
        }

        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("目标语言不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        match translation::ApiUrl::get_set() {
            Ok(Some(api_url)) => {
                tracing::info!("环境变量覆盖翻译接口: {}", api_url);
                self.api_url = api_url;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match translation::SourceLang::get_set() {
            Ok(Some(lang)) => self.source_lang = lang,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match translation::TargetLang::get_set() {
            Ok(Some(lang)) => self.target_lang = lang,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match translation::RateLimitDelay::get_set() {
            Ok(Some(delay)) => self.rate_limit_delay = delay,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match translation::MaxSegmentLength::get_set() {
            Ok(Some(length)) => self.max_segment_length = length,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = TranslatorConfig::default();
        assert_eq!(config.rate_limit_delay, Duration::from_millis(200));
        assert_eq!(config.max_segment_length, 1000);
        assert_eq!(config.source_lang, "auto");
        assert_eq!(config.target_lang, "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = TranslatorConfig::default();
        config.max_segment_length = 0;
        assert!(config.validate().is_err());

        let mut config = TranslatorConfig::default();
        config.api_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_uses_millis() {
        let config: TranslatorConfig = toml::from_str("rate_limit_delay = 350\ntarget_lang = \"fr\"").unwrap();
        assert_eq!(config.rate_limit_delay, Duration::from_millis(350));
        assert_eq!(config.target_lang, "fr");
        assert_eq!(config.max_segment_length, MAX_SEGMENT_LENGTH);
    }
}
