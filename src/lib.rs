//! # Wordwise Library
//!
//! 可见文本监控与按 CEFR 等级注释网页的工具库。
//!
//! ## 模块组织
//!
//! - `core` - 注释流程与顶层错误类型
//! - `monitor` - 可见的直接文本元素监控引擎
//! - `parsers` - HTML 解析、DOM 操作与序列化
//! - `translation` - 机器翻译客户端（限速、长文本分段）
//! - `llm` - 大模型调用与词汇输出解析
//! - `tokens` - 分词服务桥接
//! - `config` - 用户配置与存储
//! - `env` - 环境变量

pub mod config;
pub mod core;
pub mod env;
pub mod llm;
pub mod monitor;
pub mod parsers;
pub mod tokens;
pub mod translation;

// Re-export commonly used items for convenience
pub use self::core::*;
pub use monitor::{Element, MonitorState, TextMonitor};
pub use parsers::*;
