//! 应用层错误定义
//!
//! 一次 generate 调用的所有失败类型；Display 即为写入 `error` 的用户可读文案

use thiserror::Error;

use crate::application::ports::ApiError;
use crate::domain::job::JobId;

/// 轮询传输失败且没有具体信息时的兜底文案
pub const POLLING_FALLBACK_MESSAGE: &str =
    "Lost contact with the generation service. Please try again.";

/// 服务端未提供失败原因时的兜底文案
pub const JOB_FAILED_FALLBACK_MESSAGE: &str = "Generation failed";

/// 生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 创建任务失败，原样透出传输层信息
    #[error("{0}")]
    Submission(#[source] ApiError),

    /// 查询状态时的网络/服务错误
    #[error("{}", polling_message(.0))]
    PollingTransport(#[source] ApiError),

    /// 服务端报告 status=failed
    #[error("{0}")]
    JobFailed(String),

    /// status=complete 但没有 result
    #[error("Generation finished without a book. Please try again.")]
    ProtocolViolation { job_id: JobId },

    /// 超过最长等待时间
    #[error("Generation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// 调用方取消或会话结束
    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// 服务端报告任务 failed 时的错误，缺少信息时使用兜底文案
    pub fn job_failed(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(JOB_FAILED_FALLBACK_MESSAGE);
        Self::JobFailed(message.to_string())
    }

    /// 用于日志的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Submission(_) => "submission",
            GenerationError::PollingTransport(_) => "polling_transport",
            GenerationError::JobFailed(_) => "job_failed",
            GenerationError::ProtocolViolation { .. } => "protocol_violation",
            GenerationError::Timeout { .. } => "timeout",
            GenerationError::Cancelled => "cancelled",
        }
    }
}

fn polling_message(err: &ApiError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        POLLING_FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_message_is_unchanged() {
        let err = GenerationError::Submission(ApiError::service(402, "quota exceeded"));
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(err.kind(), "submission");
    }

    #[test]
    fn test_polling_fallback_message() {
        let err = GenerationError::PollingTransport(ApiError::Unauthorized(String::new()));
        assert_eq!(err.to_string(), POLLING_FALLBACK_MESSAGE);

        let err = GenerationError::PollingTransport(ApiError::Timeout);
        assert_eq!(err.to_string(), "Request timed out");
    }

    #[test]
    fn test_job_failed_fallback() {
        assert_eq!(
            GenerationError::job_failed(Some("unsafe content detected")).to_string(),
            "unsafe content detected"
        );
        assert_eq!(
            GenerationError::job_failed(Some("  ")).to_string(),
            JOB_FAILED_FALLBACK_MESSAGE
        );
        assert_eq!(
            GenerationError::job_failed(None).to_string(),
            JOB_FAILED_FALLBACK_MESSAGE
        );
    }
}
