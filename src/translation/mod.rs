//! 机器翻译模块
//!
//! - **config**: 接口地址、语言、限速与分段参数
//! - **segment**: 按句界切分长文本
//! - **backend**: 单段翻译后端（Google 网页端接口）
//! - **translator**: 限速 + 分段的翻译客户端
//! - **error**: 各协作服务共用的错误类型
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use wordwise::translation::{TranslateOptions, Translator, TranslatorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let translator = Translator::google(TranslatorConfig::default())?;
//! let english = translator
//!     .translate("我很乐意提供帮助。", &TranslateOptions::new("auto", "en"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod segment;
pub mod translator;

pub use backend::{GoogleTranslateBackend, TranslateBackend};
pub use config::{TranslatorConfig, DEFAULT_TRANSLATE_URL, MAX_SEGMENT_LENGTH, RATE_LIMIT_DELAY};
pub use error::{ErrorCategory, ErrorSeverity, ErrorStats, TranslationError, TranslationResult};
pub use segment::segment_long_text;
pub use translator::{TranslateOptions, Translator, TranslatorStats};
