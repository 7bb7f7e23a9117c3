//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `TAILORMADE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `TAILORMADE_API__BASE_URL=https://books.example.com/api/v1`
/// - `TAILORMADE_API__TOKEN=...`
/// - `TAILORMADE_GENERATION__MAX_WAIT_SECS=900`
/// - `TAILORMADE_GENERATION__POLL_RETRY__MAX_RETRIES=3`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("api.base_url", "http://localhost:8000/api/v1")?
        .set_default("api.timeout_secs", 120)?
        .set_default("generation.initial_delay_ms", 1000)?
        .set_default("generation.poll_interval_ms", 2000)?
        .set_default("generation.max_wait_secs", 600)?
        .set_default("generation.poll_retry.max_retries", 0)?
        .set_default("generation.poll_retry.backoff_ms", 500)?
        .set_default("generation.poll_retry.max_backoff_ms", 8000)?
        .set_default("session.root_dir", "data/sessions")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: TAILORMADE_
    // 层级分隔符: __ (双下划线)
    // 例如: TAILORMADE_API__BASE_URL=http://books:8000/api/v1
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("TAILORMADE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "API base URL cannot be empty".to_string(),
        ));
    }

    if config.generation.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Poll interval cannot be 0".to_string(),
        ));
    }

    if config.session.root_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Session root directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("API Base URL: {}", config.api.base_url);
    tracing::info!("API Timeout: {}s", config.api.timeout_secs);
    tracing::info!(
        "API Token: {}",
        if config.api.token.is_some() { "<redacted>" } else { "<none>" }
    );
    tracing::info!("Initial Delay: {}ms", config.generation.initial_delay_ms);
    tracing::info!("Poll Interval: {}ms", config.generation.poll_interval_ms);
    if config.generation.max_wait_secs > 0 {
        tracing::info!("Max Wait: {}s", config.generation.max_wait_secs);
    } else {
        tracing::info!("Max Wait: unbounded");
    }
    tracing::info!("Poll Retries: {}", config.generation.poll_retry.max_retries);
    tracing::info!("Session Root: {:?}", config.session.root_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
