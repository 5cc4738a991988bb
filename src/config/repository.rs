//! 配置仓库
//!
//! 用户配置按键存取。调用方显式注入仓库实例，不依赖全局存储。

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use super::user::{UserConfig, USER_CONFIG_KEY};
use crate::translation::error::{TranslationError, TranslationResult};

/// 配置文件搜索路径
pub const CONFIG_PATHS: &[&str] = &[
    "wordwise.toml",
    ".wordwise.toml",
    "~/.config/wordwise/config.toml",
    "/etc/wordwise/config.toml",
];

/// 按键存取用户配置
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// 读取配置，键不存在时返回 `Ok(None)`
    async fn load(&self, key: &str) -> TranslationResult<Option<UserConfig>>;

    async fn store(&self, key: &str, config: &UserConfig) -> TranslationResult<()>;
}

/// 基于文件的配置仓库
///
/// 文件的顶层键即存储键。`.toml` 结尾按 TOML 解析，其余按 JSON 解析。
#[derive(Debug, Clone)]
pub struct FileConfigRepository {
    path: PathBuf,
}

impl FileConfigRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
        Self {
            path: PathBuf::from(expanded),
        }
    }

    /// 加载 `.env` 并在搜索路径中查找已存在的配置文件；都不存在时使用第一个路径
    pub fn discover() -> Self {
        Self::load_dotenv();

        for path in CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::new(expanded_path.as_ref());
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Self::new(CONFIG_PATHS[0])
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_toml(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "toml")
    }

    fn read_document(&self) -> TranslationResult<BTreeMap<String, UserConfig>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件失败: {}", e))
        })?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        if self.is_toml() {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    fn write_document(&self, document: &BTreeMap<String, UserConfig>) -> TranslationResult<()> {
        let content = if self.is_toml() {
            toml::to_string_pretty(document)
                .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(document)
                .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| TranslationError::ConfigError(format!("创建配置目录失败: {}", e)))?;
        }

        std::fs::write(&self.path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> TranslationResult<()> {
        let repository = Self::new(path);
        let mut document = BTreeMap::new();
        document.insert(USER_CONFIG_KEY.to_string(), UserConfig::default());
        repository.write_document(&document)
    }
}

#[async_trait]
impl ConfigRepository for FileConfigRepository {
    async fn load(&self, key: &str) -> TranslationResult<Option<UserConfig>> {
        let mut document = self.read_document()?;
        Ok(document.remove(key))
    }

    async fn store(&self, key: &str, config: &UserConfig) -> TranslationResult<()> {
        let mut document = self.read_document()?;
        document.insert(key.to_string(), config.clone());
        self.write_document(&document)?;
        tracing::info!("配置已保存到 {}", self.path.display());
        Ok(())
    }
}

/// 内存配置仓库
#[derive(Debug, Default)]
pub struct MemoryConfigRepository {
    entries: RwLock<HashMap<String, UserConfig>>,
}

impl MemoryConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_config(config: UserConfig) -> Self {
        let repository = Self::new();
        if let Ok(mut entries) = repository.entries.write() {
            entries.insert(USER_CONFIG_KEY.to_string(), config);
        }
        repository
    }
}

#[async_trait]
impl ConfigRepository for MemoryConfigRepository {
    async fn load(&self, key: &str) -> TranslationResult<Option<UserConfig>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| TranslationError::InternalError("配置仓库锁已损坏".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn store(&self, key: &str, config: &UserConfig) -> TranslationResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| TranslationError::InternalError("配置仓库锁已损坏".to_string()))?;
        entries.insert(key.to_string(), config.clone());
        Ok(())
    }
}

/// 读取用户配置
///
/// 键不存在或读取失败时退回默认配置，随后依次应用环境变量覆盖、
/// 校验，并在缺少 baseURL 时从厂商目录补全。
pub async fn get_user_config(repository: &dyn ConfigRepository) -> TranslationResult<UserConfig> {
    let mut config = match repository.load(USER_CONFIG_KEY).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::info!("未找到用户配置，使用默认配置");
            UserConfig::default()
        }
        Err(e) => {
            tracing::warn!("读取用户配置失败，使用默认配置: {}", e);
            UserConfig::default()
        }
    };

    config.apply_env_overrides();
    config.validate()?;

    if config.base_url.is_none() {
        match config.resolved_base_url() {
            Some(base_url) => config.base_url = Some(base_url),
            None => tracing::warn!("厂商目录中没有 {}，未设置 baseURL", config.model_company),
        }
    }

    Ok(config)
}
