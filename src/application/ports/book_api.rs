//! Book API Port - 生成任务接口抽象
//!
//! 定义提交与查询生成任务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::book::GenerationRequest;
use crate::domain::job::{GenerationStatus, JobId};

/// 通用兜底提示
pub const GENERIC_REQUEST_FAILURE: &str = "Something went wrong. Please try again.";

/// 传输层错误
///
/// Display 即为面向用户的提示文案
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out")]
    Timeout,

    /// 401，传输层已触发登出
    #[error("{0}")]
    Unauthorized(String),

    /// 非 2xx 响应，message 优先取服务端的 detail
    #[error("{message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::ServiceError {
            status,
            message: if message.trim().is_empty() {
                GENERIC_REQUEST_FAILURE.to_string()
            } else {
                message
            },
        }
    }

    /// 是否值得重试（网络抖动、超时、5xx、429）
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::NetworkError(_) | ApiError::Timeout => true,
            ApiError::ServiceError { status, .. } => *status >= 500 || *status == 429,
            ApiError::Unauthorized(_) | ApiError::InvalidResponse(_) => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::ServiceError { status, .. } => Some(*status),
            ApiError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }
}

/// Book API Port
///
/// 外部生成服务的抽象接口
#[async_trait]
pub trait BookApiPort: Send + Sync {
    /// 提交生成任务
    ///
    /// `POST /books/generate`，返回 status=pending 的初始状态
    async fn submit_job(&self, request: &GenerationRequest) -> Result<GenerationStatus, ApiError>;

    /// 查询任务状态
    ///
    /// `GET /books/generate/{job_id}`
    async fn job_status(&self, job_id: &JobId) -> Result<GenerationStatus, ApiError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
