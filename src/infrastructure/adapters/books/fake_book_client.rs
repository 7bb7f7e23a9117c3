//! Fake Book Client - 用于测试与本地演示的生成服务客户端
//!
//! 按脚本依次返回状态，不实际调用服务端；脚本耗尽后一直返回 generating

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{ApiError, BookApiPort};
use crate::domain::book::{GeneratedBook, GenerationRequest, PageResult};
use crate::domain::job::{GenerationStatus, JobId};

/// Fake Book Client
pub struct FakeBookClient {
    job_id: JobId,
    submit_response: Mutex<Option<Result<GenerationStatus, ApiError>>>,
    statuses: Mutex<VecDeque<Result<GenerationStatus, ApiError>>>,
    last_progress: Mutex<u8>,
    latency: Duration,
    submitted: Mutex<Vec<GenerationRequest>>,
    submit_calls: AtomicU32,
    poll_calls: AtomicU32,
}

impl FakeBookClient {
    /// 提交总是成功并返回 `job_id`
    pub fn new(job_id: impl Into<JobId>) -> Self {
        Self {
            job_id: job_id.into(),
            submit_response: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            last_progress: Mutex::new(0),
            latency: Duration::ZERO,
            submitted: Mutex::new(Vec::new()),
            submit_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
        }
    }

    /// 演示脚本：排队 → 逐页绘制 → 完成
    pub fn demo(request: &GenerationRequest) -> Self {
        let job_id = format!("fake-{}", uuid::Uuid::new_v4());
        let pages = u32::from(request.page_count);
        let mut client = Self::new(job_id.as_str())
            .with_latency(Duration::from_millis(200))
            .with_status(GenerationStatus::pending(job_id.as_str()).with_message("Waiting for a free artist..."))
            .with_status(GenerationStatus::generating(job_id.as_str(), 10, "Planning scenes"));

        for page in 1..=pages {
            let progress = (10 + page * 85 / pages.max(1)).min(95) as u8;
            client = client.with_status(GenerationStatus::generating(
                job_id.as_str(),
                progress,
                format!("Drawing page {} of {}", page, pages),
            ));
        }

        let mut book = Self::sample_book(&request.title, pages);
        book.theme = request.theme.clone();
        client.with_status(GenerationStatus::complete(job_id.as_str(), Some(book)))
    }

    /// 覆盖提交响应
    pub fn with_submit_response(self, status: GenerationStatus) -> Self {
        *self.submit_response.lock().unwrap_or_else(|p| p.into_inner()) = Some(Ok(status));
        self
    }

    /// 提交失败
    pub fn with_submit_error(self, error: ApiError) -> Self {
        *self.submit_response.lock().unwrap_or_else(|p| p.into_inner()) = Some(Err(error));
        self
    }

    /// 追加一次轮询结果
    pub fn with_status(self, status: GenerationStatus) -> Self {
        self.push(Ok(status));
        self
    }

    /// 追加一次轮询失败
    pub fn with_status_error(self, error: ApiError) -> Self {
        self.push(Err(error));
        self
    }

    /// 每次请求的模拟延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push(&self, response: Result<GenerationStatus, ApiError>) {
        self.statuses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(response);
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }

    /// 已收到的提交请求
    pub fn submitted_requests(&self) -> Vec<GenerationRequest> {
        self.submitted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// 构造示例绘本
    pub fn sample_book(title: &str, pages: u32) -> GeneratedBook {
        let book_id = format!("book-{}", title.to_lowercase().replace(' ', "-"));
        GeneratedBook {
            book_id: book_id.clone(),
            title: title.to_string(),
            theme: String::new(),
            page_count: pages,
            pages: (1..=pages)
                .map(|n| PageResult {
                    page_number: n,
                    scene_description: format!("Scene {}", n),
                    image_url: format!("https://cdn.example.com/{}/page_{}.png", book_id, n),
                    thumbnail_url: format!("https://cdn.example.com/{}/page_{}_thumb.png", book_id, n),
                })
                .collect(),
            pdf_url: format!("https://cdn.example.com/{}/book.pdf", book_id),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            user_uid: "fake-user".to_string(),
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl BookApiPort for FakeBookClient {
    async fn submit_job(&self, request: &GenerationRequest) -> Result<GenerationStatus, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request.clone());
        self.simulate_latency().await;

        let scripted = self
            .submit_response
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        tracing::debug!(job_id = %self.job_id, "FakeBookClient: job submitted");
        scripted.unwrap_or_else(|| {
            Ok(GenerationStatus::pending(self.job_id.clone()).with_message("Job queued"))
        })
    }

    async fn job_status(&self, job_id: &JobId) -> Result<GenerationStatus, ApiError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let next = self
            .statuses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();

        let mut last_progress = self.last_progress.lock().unwrap_or_else(|p| p.into_inner());
        match next {
            Some(Ok(status)) => {
                *last_progress = status.progress;
                Ok(status)
            }
            Some(Err(e)) => Err(e),
            None => Ok(GenerationStatus::generating(job_id.clone(), *last_progress, "")),
        }
    }
}
