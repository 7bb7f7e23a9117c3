//! Status Poller - 固定间隔轮询任务状态
//!
//! 每次请求都在上一次返回后才发出，状态按响应顺序生效。
//! 所有挂起点（首轮延迟、请求、间隔、重试退避）都受取消令牌与最长等待时间约束。

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::error::GenerationError;
use crate::application::ports::BookApiPort;
use crate::domain::book::GeneratedBook;
use crate::domain::job::{GenerationStatus, JobHandle, JobId, JobState};

/// 轮询失败重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 单次查询允许的重试次数，0 表示失败即终止
    pub max_retries: u32,
    /// 首次退避时长
    pub backoff: Duration,
    /// 退避上限
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// 第 attempt 次重试前的等待（指数退避）
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }
}

/// 轮询策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// 提交后首次查询前的等待
    pub initial_delay: Duration,
    /// 两次查询之间的固定间隔
    pub interval: Duration,
    /// 轮询阶段的最长等待，None 表示不限
    pub max_wait: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            interval: Duration::from_secs(2),
            max_wait: Some(Duration::from_secs(600)),
            retry: RetryPolicy::default(),
        }
    }
}

/// 状态轮询器
pub struct StatusPoller {
    api: Arc<dyn BookApiPort>,
    policy: PollPolicy,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn BookApiPort>, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// 轮询直到终态
    ///
    /// 每次收到状态后先写入 `handle`，再回调 `on_update`
    pub async fn run<F>(
        &self,
        handle: &mut JobHandle,
        cancel: &CancellationToken,
        on_update: F,
    ) -> Result<GeneratedBook, GenerationError>
    where
        F: FnMut(&JobHandle),
    {
        let max_wait = self.policy.max_wait;
        let polling = self.poll_loop(handle, on_update);

        let bounded = async {
            match max_wait {
                Some(limit) => tokio::time::timeout(limit, polling)
                    .await
                    .unwrap_or(Err(GenerationError::Timeout {
                        secs: limit.as_secs(),
                    })),
                None => polling.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            result = bounded => result,
        }
    }

    async fn poll_loop<F>(
        &self,
        handle: &mut JobHandle,
        mut on_update: F,
    ) -> Result<GeneratedBook, GenerationError>
    where
        F: FnMut(&JobHandle),
    {
        tokio::time::sleep(self.policy.initial_delay).await;

        loop {
            let status = self.fetch(handle.job_id()).await?;
            tracing::debug!(
                job_id = %handle.job_id(),
                status = %status.status,
                progress = status.progress,
                message = %status.message,
                "Job status received"
            );

            handle.record(status);
            on_update(handle);

            let latest = handle.last_status();
            match latest.status {
                JobState::Complete => {
                    return latest.result.clone().ok_or_else(|| {
                        GenerationError::ProtocolViolation {
                            job_id: handle.job_id().clone(),
                        }
                    });
                }
                JobState::Failed => {
                    return Err(GenerationError::job_failed(latest.message()));
                }
                JobState::Pending | JobState::Generating => {
                    tokio::time::sleep(self.policy.interval).await;
                }
            }
        }
    }

    /// 单次查询，按策略重试暂时性错误
    async fn fetch(&self, job_id: &JobId) -> Result<GenerationStatus, GenerationError> {
        let retry = self.policy.retry;
        let mut attempt = 0;

        loop {
            match self.api.job_status(job_id).await {
                Ok(status) => return Ok(status),
                Err(e) if e.is_transient() && attempt < retry.max_retries => {
                    let delay = retry.delay_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        job_id = %job_id,
                        error = %e,
                        attempt = attempt,
                        max_retries = retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Status check failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(GenerationError::PollingTransport(e)),
            }
        }
    }
}
