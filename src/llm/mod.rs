//! 大模型调用
//!
//! - **api**: chat-completion 报文结构
//! - **caller**: OpenAI 兼容接口调用器
//! - **prompt**: CEFR 词汇提取提示词
//! - **vocabulary**: 模型输出解析

pub mod api;
pub mod caller;
pub mod prompt;
pub mod vocabulary;

pub use caller::{LlmCaller, LlmCallerConfig, EMPTY_RESPONSE, GENERIC_FAILURE};
pub use prompt::{vocabulary_user_prompt, VOCABULARY_SYSTEM_PROMPT};
pub use vocabulary::{parse_vocabulary, VocabularyEntry};
