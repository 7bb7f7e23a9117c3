//! Job Submitter - 创建生成任务

use std::sync::Arc;

use crate::application::ports::{ApiError, BookApiPort};
use crate::domain::book::GenerationRequest;
use crate::domain::job::JobHandle;

/// 任务提交器
///
/// 只调用一次，不做重试；错误原样返回
pub struct JobSubmitter {
    api: Arc<dyn BookApiPort>,
}

impl JobSubmitter {
    pub fn new(api: Arc<dyn BookApiPort>) -> Self {
        Self { api }
    }

    pub async fn submit(&self, request: &GenerationRequest) -> Result<JobHandle, ApiError> {
        tracing::debug!(
            title = %request.title,
            page_count = request.page_count,
            age_range = %request.age_range,
            art_style = %request.art_style,
            "Submitting generation job"
        );

        let status = self.api.submit_job(request).await?;
        if status.job_id.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Submission response has no job id".to_string(),
            ));
        }

        tracing::info!(
            job_id = %status.job_id,
            status = %status.status,
            "Generation job queued"
        );

        Ok(JobHandle::new(status))
    }
}
