//! Job Context - Job Handle

use chrono::{DateTime, Utc};

use super::{GenerationStatus, JobId};

/// 客户端持有的任务句柄：任务 ID + 最近一次已知状态
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: JobId,
    last_status: GenerationStatus,
    polls: u32,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobHandle {
    /// 由提交响应创建
    pub fn new(initial: GenerationStatus) -> Self {
        let now = Utc::now();
        Self {
            job_id: initial.job_id.clone(),
            last_status: initial,
            polls: 0,
            submitted_at: now,
            updated_at: now,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn last_status(&self) -> &GenerationStatus {
        &self.last_status
    }

    /// 已完成的轮询次数
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 记录一次轮询结果
    pub fn record(&mut self, status: GenerationStatus) {
        if status.job_id != self.job_id {
            tracing::warn!(
                job_id = %self.job_id,
                reported_job_id = %status.job_id,
                "Status response carries a different job id"
            );
        }
        self.last_status = status;
        self.polls += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobState;

    #[test]
    fn test_record_updates_last_status() {
        let mut handle = JobHandle::new(GenerationStatus::pending("job-1"));
        assert_eq!(handle.polls(), 0);
        assert_eq!(handle.last_status().status, JobState::Pending);

        handle.record(GenerationStatus::generating("job-1", 30, "Sketching"));
        assert_eq!(handle.polls(), 1);
        assert_eq!(handle.last_status().progress, 30);
        assert_eq!(handle.job_id().as_str(), "job-1");
    }
}
