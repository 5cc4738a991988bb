//! 用户配置
//!
//! - **user**: 用户配置记录与 CEFR 等级
//! - **provider**: 大模型厂商目录
//! - **repository**: 按键存取配置的仓库（文件 / 内存）

pub mod provider;
pub mod repository;
pub mod user;

pub use provider::{find_provider, provider_for_model, LlmProvider, MAJOR_LLM_PROVIDERS};
pub use repository::{
    get_user_config, ConfigRepository, FileConfigRepository, MemoryConfigRepository, CONFIG_PATHS,
};
pub use user::{CefrLevel, UserConfig, USER_CONFIG_KEY};
