//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的 `WORDWISE_*` 环境变量访问

use std::env;
use std::fmt;
use std::time::Duration;

use crate::config::CefrLevel;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 只读取显式设置的值，未设置时返回 `Ok(None)`
    fn get_set() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "WORDWISE_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 用户配置覆盖
pub mod user {
    use super::*;

    /// CEFR 等级
    pub struct Cefr;
    impl EnvVar<CefrLevel> for Cefr {
        const NAME: &'static str = "WORDWISE_CEFR";
        const DEFAULT: Option<CefrLevel> = Some(CefrLevel::A1);
        const DESCRIPTION: &'static str = "Learner CEFR level: A1, A2, B1, B2, C1, C2";

        fn parse(value: &str) -> EnvResult<CefrLevel> {
            value.parse().map_err(|message| EnvError {
                variable: Self::NAME.to_string(),
                message,
            })
        }
    }

    /// 模型厂商
    pub struct ModelCompany;
    impl EnvVar<String> for ModelCompany {
        const NAME: &'static str = "WORDWISE_MODEL_COMPANY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "LLM provider name as listed in the provider catalog";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 模型名称
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "WORDWISE_MODEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Chat-completion model name";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "WORDWISE_API_KEY";
        const DEFAULT: Option<String> = None; // 无默认值
        const DESCRIPTION: &'static str = "API key for the chat-completion endpoint";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 模型服务地址
    pub struct BaseUrl;
    impl EnvVar<String> for BaseUrl {
        const NAME: &'static str = "WORDWISE_BASE_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "OpenAI-compatible base URL (defaults to the provider's catalog entry)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }
}

/// 机器翻译相关环境变量
pub mod translation {
    use super::*;

    /// 翻译接口地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "WORDWISE_TRANSLATE_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::config::DEFAULT_TRANSLATE_URL.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Machine translation endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "WORDWISE_SOURCE_LANG";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("auto".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Source language for translation ('auto' for detection)";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim().to_lowercase();
            if lang == "auto" || is_language_code(&lang) {
                Ok(lang)
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must be 'auto' or an ISO 639-1 code".to_string(),
                })
            }
        }
    }

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "WORDWISE_TARGET_LANG";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("en".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Target language for translation (ISO 639-1 code)";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim().to_lowercase();
            if !is_language_code(&lang) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must be an ISO 639-1 code (e.g. en, zh-CN)".to_string(),
                });
            }
            Ok(lang)
        }
    }

    /// 两次调用之间的最小间隔
    pub struct RateLimitDelay;
    impl EnvVar<Duration> for RateLimitDelay {
        const NAME: &'static str = "WORDWISE_RATE_LIMIT_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(200));
        const DESCRIPTION: &'static str = "Minimum delay between translation calls in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis: u64 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number of milliseconds".to_string(),
            })?;
            if millis > 60_000 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Delay too long (max 60000 ms)".to_string(),
                });
            }
            Ok(Duration::from_millis(millis))
        }
    }

    /// 单段最大字符数
    pub struct MaxSegmentLength;
    impl EnvVar<usize> for MaxSegmentLength {
        const NAME: &'static str = "WORDWISE_MAX_SEGMENT_LENGTH";
        const DEFAULT: Option<usize> = Some(1000);
        const DESCRIPTION: &'static str = "Maximum characters per translation request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 16, 5000)
        }
    }
}

/// 分词服务
pub mod segmentation {
    use super::*;

    /// 分词服务地址
    pub struct ServiceUrl;
    impl EnvVar<String> for ServiceUrl {
        const NAME: &'static str = "WORDWISE_SEGMENTER_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::tokens::DEFAULT_SEGMENTER_URL.to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Word segmentation / alignment service base URL";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }
}

/// 无头视口
pub mod viewport {
    use super::*;

    /// 视口高度
    pub struct Height;
    impl EnvVar<usize> for Height {
        const NAME: &'static str = "WORDWISE_VIEWPORT_HEIGHT";
        const DEFAULT: Option<usize> = Some(800);
        const DESCRIPTION: &'static str = "Headless viewport height in pixels";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100_000)
        }
    }

    /// 行高
    pub struct LineHeight;
    impl EnvVar<usize> for LineHeight {
        const NAME: &'static str = "WORDWISE_LINE_HEIGHT";
        const DEFAULT: Option<usize> = Some(24);
        const DESCRIPTION: &'static str = "Estimated line height in pixels";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1000)
        }
    }

    /// 每行字符数
    pub struct CharsPerLine;
    impl EnvVar<usize> for CharsPerLine {
        const NAME: &'static str = "WORDWISE_CHARS_PER_LINE";
        const DEFAULT: Option<usize> = Some(40);
        const DESCRIPTION: &'static str = "Estimated characters per rendered line";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1000)
        }
    }
}

/// 辅助函数
fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Value must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

fn parse_http_url(value: &str, var_name: &str) -> EnvResult<String> {
    let url = value.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: "URL must start with http:// or https://".to_string(),
        })
    }
}

fn is_language_code(lang: &str) -> bool {
    let mut parts = lang.split('-');
    let primary = parts.next().unwrap_or_default();
    primary.len() == 2
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && parts.all(|region| !region.is_empty() && region.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,
    pub no_color: bool,

    // 用户配置覆盖
    pub cefr: Option<CefrLevel>,
    pub model_company: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,

    // 翻译配置
    pub translate_url: String,
    pub source_lang: String,
    pub target_lang: String,
    pub rate_limit_delay: Duration,
    pub max_segment_length: usize,

    // 分词服务
    pub segmenter_url: String,

    // 视口
    pub viewport_height: usize,
    pub line_height: usize,
    pub chars_per_line: usize,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            cefr: user::Cefr::get_set()?,
            model_company: user::ModelCompany::get_set()?,
            model: user::Model::get_set()?,
            api_key: user::ApiKey::get_set()?,
            base_url: user::BaseUrl::get_set()?,

            translate_url: translation::ApiUrl::get()?,
            source_lang: translation::SourceLang::get()?,
            target_lang: translation::TargetLang::get()?,
            rate_limit_delay: translation::RateLimitDelay::get()?,
            max_segment_length: translation::MaxSegmentLength::get()?,

            segmenter_url: segmentation::ServiceUrl::get()?,

            viewport_height: viewport::Height::get()?,
            line_height: viewport::LineHeight::get()?,
            chars_per_line: viewport::CharsPerLine::get()?,
        })
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Log Level: {}", self.log_level);
        if let Some(cefr) = self.cefr {
            println!("  CEFR: {}", cefr);
        }
        if let Some(model) = &self.model {
            println!("  Model: {}", model);
        }
        if self.api_key.is_some() {
            println!("  API Key: [configured]");
        }
        println!(
            "  Translation: {} ({} -> {})",
            self.translate_url, self.source_lang, self.target_lang
        );
        println!("  Segmenter: {}", self.segmenter_url);
    }
}

macro_rules! doc_line {
    ($docs:expr, $var:ty) => {
        $docs.push_str(&format!(
            "- `{}`: {} (default: {:?})\n",
            <$var>::NAME,
            <$var>::DESCRIPTION,
            <$var>::DEFAULT
        ));
    };
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    doc_line!(docs, core::LogLevel);
    doc_line!(docs, core::NoColor);

    docs.push_str("\n## User Configuration Overrides\n\n");
    doc_line!(docs, user::Cefr);
    doc_line!(docs, user::ModelCompany);
    doc_line!(docs, user::Model);
    doc_line!(docs, user::ApiKey);
    doc_line!(docs, user::BaseUrl);

    docs.push_str("\n## Translation Configuration\n\n");
    doc_line!(docs, translation::ApiUrl);
    doc_line!(docs, translation::SourceLang);
    doc_line!(docs, translation::TargetLang);
    doc_line!(docs, translation::RateLimitDelay);
    doc_line!(docs, translation::MaxSegmentLength);

    docs.push_str("\n## Segmentation Service\n\n");
    doc_line!(docs, segmentation::ServiceUrl);

    docs.push_str("\n## Headless Viewport\n\n");
    doc_line!(docs, viewport::Height);
    doc_line!(docs, viewport::LineHeight);
    doc_line!(docs, viewport::CharsPerLine);

    docs
}
