//! 用户配置记录

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::provider::{find_provider, MAJOR_LLM_PROVIDERS};
use crate::translation::error::{TranslationError, TranslationResult};

/// 用户配置在存储中的键
pub const USER_CONFIG_KEY: &str = "USER_CONFIG_KEY";

/// CEFR 语言能力等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum CefrLevel {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }

    /// 高一级；C2 没有更高等级
    pub fn next(&self) -> Option<CefrLevel> {
        let index = Self::ALL.iter().position(|level| level == self)?;
        Self::ALL.get(index + 1).copied()
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CefrLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| format!("Invalid CEFR level '{}'. Use: A1, A2, B1, B2, C1, C2", s))
    }
}

/// 用户配置
///
/// 字段名与扩展存储中的记录保持一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "CEFR")]
    pub cefr: CefrLevel,
    #[serde(rename = "modelCompany")]
    pub model_company: String,
    pub model: String,
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for UserConfig {
    /// 最低的 CEFR 等级，目录中第一家厂商的第一个模型
    fn default() -> Self {
        let provider = &MAJOR_LLM_PROVIDERS[0];
        Self {
            cefr: CefrLevel::ALL[0],
            model_company: provider.company.to_string(),
            model: provider.models[0].to_string(),
            api_key: None,
            base_url: None,
        }
    }
}

impl UserConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.model.trim().is_empty() {
            return Err(TranslationError::ConfigError("模型名称不能为空".to_string()));
        }

        if self.model_company.trim().is_empty() && self.base_url.is_none() {
            return Err(TranslationError::ConfigError(
                "未指定模型厂商时必须提供 baseURL".to_string(),
            ));
        }

        if let Some(base_url) = &self.base_url {
            if url::Url::parse(base_url).is_err() {
                return Err(TranslationError::ConfigError(format!(
                    "无效的 baseURL: {}",
                    base_url
                )));
            }
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{user, EnvVar};

        match user::Cefr::get_set() {
            Ok(Some(cefr)) => self.cefr = cefr,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match user::ModelCompany::get_set() {
            Ok(Some(company)) => self.model_company = company,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match user::Model::get_set() {
            Ok(Some(model)) => self.model = model,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match user::ApiKey::get_set() {
            Ok(Some(api_key)) => self.api_key = Some(api_key),
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match user::BaseUrl::get_set() {
            Ok(Some(base_url)) => {
                tracing::info!("环境变量覆盖模型服务地址: {}", base_url);
                self.base_url = Some(base_url);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }
    }

    /// 显式配置的地址，否则取厂商目录中的地址
    pub fn resolved_base_url(&self) -> Option<String> {
        self.base_url.clone().or_else(|| {
            find_provider(&self.model_company).map(|provider| provider.base_url.to_string())
        })
    }

    /// 打印时隐藏密钥
    pub fn redacted(&self) -> UserConfig {
        UserConfig {
            api_key: self.api_key.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert_eq!(config.cefr, CefrLevel::A1);
        assert_eq!(config.model_company, "OpenAI");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(
            config.resolved_base_url().as_deref(),
            Some("https://api.openai.com/v1")
        );
    }

    #[test]
    fn test_cefr_parsing_and_order() {
        assert_eq!("c1".parse::<CefrLevel>().unwrap(), CefrLevel::C1);
        assert!("Z9".parse::<CefrLevel>().is_err());
        assert_eq!(CefrLevel::A2.next(), Some(CefrLevel::B1));
        assert_eq!(CefrLevel::C2.next(), None);
        assert!(CefrLevel::B1 < CefrLevel::B2);
    }

    #[test]
    fn test_stored_record_field_names() {
        let json = r#"{"CEFR":"B2","modelCompany":"DeepSeek AI","model":"deepseek-chat","apiKey":"sk-test"}"#;
        let config: UserConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.cefr, CefrLevel::B2);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.resolved_base_url().as_deref(),
            Some("https://api.deepseek.com")
        );

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["modelCompany"], "DeepSeek AI");
        assert!(value.get("baseURL").is_none());
    }

    #[test]
    fn test_validation() {
        let mut config = UserConfig::default();
        config.base_url = Some("::bad::".to_string());
        assert!(config.validate().is_err());

        let mut config = UserConfig::default();
        config.model = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_hides_key() {
        let config = UserConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.redacted().api_key.as_deref(), Some("********"));
    }
}
