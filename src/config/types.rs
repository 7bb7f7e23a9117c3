//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{PollPolicy, RetryPolicy};
use crate::infrastructure::HttpBookClientConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 生成服务 API 配置
    #[serde(default)]
    pub api: ApiConfig,

    /// 轮询配置
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 浏览会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 生成服务 API 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API 基础 URL（含 /api/v1）
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// bearer token，未设置时匿名请求
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_api_timeout() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout(),
            token: None,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> HttpBookClientConfig {
        HttpBookClientConfig::new(self.base_url.clone()).with_timeout(self.timeout_secs)
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// 提交后首次查询前的等待（毫秒）
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// 固定轮询间隔（毫秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// 轮询最长等待（秒），0 表示不限
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,

    #[serde(default)]
    pub poll_retry: PollRetryConfig,
}

fn default_initial_delay() -> u64 {
    1000
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_max_wait() -> u64 {
    600 // 10 分钟
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            poll_interval_ms: default_poll_interval(),
            max_wait_secs: default_max_wait(),
            poll_retry: PollRetryConfig::default(),
        }
    }
}

impl GenerationConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            interval: Duration::from_millis(self.poll_interval_ms),
            max_wait: (self.max_wait_secs > 0).then(|| Duration::from_secs(self.max_wait_secs)),
            retry: RetryPolicy {
                max_retries: self.poll_retry.max_retries,
                backoff: Duration::from_millis(self.poll_retry.backoff_ms),
                max_backoff: Duration::from_millis(self.poll_retry.max_backoff_ms),
            },
        }
    }
}

/// 轮询失败重试配置
///
/// 只重试瞬时错误（网络、超时、5xx、429）
#[derive(Debug, Clone, Deserialize)]
pub struct PollRetryConfig {
    /// 最大重试次数，0 表示失败即终止
    #[serde(default)]
    pub max_retries: u32,

    /// 首次退避（毫秒），之后逐次翻倍
    #[serde(default = "default_backoff")]
    pub backoff_ms: u64,

    /// 退避上限（毫秒）
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    8000
}

impl Default for PollRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff_ms: default_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

/// 浏览会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 会话目录的根
    #[serde(default = "default_session_root")]
    pub root_dir: PathBuf,
}

fn default_session_root() -> PathBuf {
    PathBuf::from("data/sessions")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root_dir: default_session_root(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
