//! Generation Orchestrator - 生成状态机
//!
//! Idle → Submitting → Polling → {Complete | Failed}
//!
//! - 同一时刻只运行一个 generate；重叠调用直接返回 `Ok(None)`，不触碰状态
//! - 成功：结果交给 ResultSink，清空草稿
//! - 失败：写入 error，保留草稿与最后的进度
//! - 取消：`cancel()` 或根令牌（浏览会话结束）会中断任意挂起点

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::poller::{PollPolicy, StatusPoller};
use super::state::GenerationState;
use super::submitter::JobSubmitter;
use crate::application::drafts::DraftSession;
use crate::application::error::GenerationError;
use crate::application::ports::{BookApiPort, ResultSinkPort};
use crate::domain::book::{GeneratedBook, GenerationRequest};
use crate::domain::job::JobHandle;

/// 生成编排器
pub struct GenerationOrchestrator {
    submitter: JobSubmitter,
    poller: StatusPoller,
    drafts: Arc<DraftSession>,
    sink: Arc<dyn ResultSinkPort>,
    state: watch::Sender<GenerationState>,
    running: AtomicBool,
    root_token: CancellationToken,
    active_token: Mutex<Option<CancellationToken>>,
    current_job: Mutex<Option<JobHandle>>,
}

impl GenerationOrchestrator {
    pub fn new(
        api: Arc<dyn BookApiPort>,
        drafts: Arc<DraftSession>,
        sink: Arc<dyn ResultSinkPort>,
        policy: PollPolicy,
    ) -> Self {
        let (state, _) = watch::channel(GenerationState::default());
        Self {
            submitter: JobSubmitter::new(api.clone()),
            poller: StatusPoller::new(api, policy),
            drafts,
            sink,
            state,
            running: AtomicBool::new(false),
            root_token: CancellationToken::new(),
            active_token: Mutex::new(None),
            current_job: Mutex::new(None),
        }
    }

    /// 挂到外部根令牌下（通常是浏览会话的令牌）
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.root_token = parent.child_token();
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 当前状态快照
    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    /// 订阅状态变化（只读）
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// 当前（或最近一次）任务句柄
    pub fn current_job(&self) -> Option<JobHandle> {
        lock(&self.current_job).clone()
    }

    pub fn drafts(&self) -> &Arc<DraftSession> {
        &self.drafts
    }

    /// 取消正在进行的生成，返回是否确有生成被取消
    pub fn cancel(&self) -> bool {
        match lock(&self.active_token).as_ref() {
            Some(token) if !token.is_cancelled() => {
                tracing::info!("Cancelling in-flight generation");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// 永久停止：取消当前生成，之后的 generate 会立即以 Cancelled 结束
    pub fn shutdown(&self) {
        tracing::info!("Generation orchestrator shutting down");
        self.root_token.cancel();
    }

    /// 生成绘本
    ///
    /// 请求应已通过 [`GenerationRequest::validate`]。
    ///
    /// # 返回
    /// - `Ok(Some(book))` - 生成成功
    /// - `Ok(None)` - 已有生成在进行，本次未启动
    /// - `Err(GenerationError)` - 生成失败，`error` 已写入状态
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<Option<GeneratedBook>, GenerationError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(title = %request.title, "Generation already in progress, request ignored");
            return Ok(None);
        }
        let _running = RunningGuard(self);

        let token = self.root_token.child_token();
        *lock(&self.active_token) = Some(token.clone());
        *lock(&self.current_job) = None;
        self.state.send_modify(GenerationState::begin);

        tracing::info!(
            title = %request.title,
            page_count = request.page_count,
            age_range = %request.age_range,
            art_style = %request.art_style,
            "Generation started"
        );

        let outcome = self.run(&request, &token).await;

        match outcome {
            Ok(book) => {
                self.finish_success(&book);
                Ok(Some(book))
            }
            Err(e) => {
                self.finish_failure(&e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        token: &CancellationToken,
    ) -> Result<GeneratedBook, GenerationError> {
        let submission = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(GenerationError::Cancelled),
            result = self.submitter.submit(request) => result,
        };
        let mut handle = submission.map_err(GenerationError::Submission)?;

        self.state.send_modify(|s| s.submitted(handle.job_id()));
        *lock(&self.current_job) = Some(handle.clone());

        self.poller
            .run(&mut handle, token, |h| self.on_poll(h))
            .await
    }

    fn on_poll(&self, handle: &JobHandle) {
        self.state
            .send_modify(|s| s.apply_status(handle.last_status()));
        *lock(&self.current_job) = Some(handle.clone());
    }

    fn finish_success(&self, book: &GeneratedBook) {
        self.sink.publish(book);

        if let Err(e) = self.drafts.clear_draft() {
            tracing::warn!(error = %e, "Failed to clear draft after generation");
        }

        self.state.send_modify(GenerationState::complete);

        tracing::info!(
            book_id = %book.book_id,
            pages = book.pages.len(),
            "Generation completed"
        );
    }

    fn finish_failure(&self, error: &GenerationError) {
        let state = self.state();
        match error {
            GenerationError::Cancelled => tracing::info!(
                progress = state.progress,
                "Generation cancelled"
            ),
            _ => tracing::error!(
                kind = error.kind(),
                error = %error,
                job_id = ?state.job_id,
                progress = state.progress,
                "Generation failed"
            ),
        }

        self.state.send_modify(|s| s.fail(error.to_string()));
    }
}

/// generate 结束（含 panic / 被 drop）时释放运行标记
///
/// future 被中途丢弃时状态仍停在 Submitting/Polling，这里按取消收尾
struct RunningGuard<'a>(&'a GenerationOrchestrator);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        let orchestrator = self.0;
        *lock(&orchestrator.active_token) = None;

        if orchestrator.state.borrow().phase.is_active() {
            tracing::info!("Generation abandoned before finishing");
            orchestrator
                .state
                .send_modify(|s| s.fail(GenerationError::Cancelled.to_string()));
        }

        orchestrator.running.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::generation::GenerationPhase;
    use crate::application::ports::{ApiError, DraftStorePort};
    use crate::domain::draft::{Draft, DraftPatch};
    use crate::domain::job::GenerationStatus;
    use crate::infrastructure::adapters::FakeBookClient;
    use crate::infrastructure::memory::{ActiveBook, InMemoryDraftStore};

    struct Harness {
        client: Arc<FakeBookClient>,
        store: Arc<InMemoryDraftStore>,
        sink: Arc<ActiveBook>,
        orchestrator: Arc<GenerationOrchestrator>,
    }

    fn harness(client: FakeBookClient) -> Harness {
        harness_with_policy(client, PollPolicy::default())
    }

    fn harness_with_policy(client: FakeBookClient, policy: PollPolicy) -> Harness {
        let client = Arc::new(client);
        let store = Arc::new(InMemoryDraftStore::new());
        let drafts = Arc::new(DraftSession::open(store.clone()).unwrap());
        let sink = Arc::new(ActiveBook::new());
        let orchestrator =
            GenerationOrchestrator::new(client.clone(), drafts, sink.clone(), policy).arc();
        Harness {
            client,
            store,
            sink,
            orchestrator,
        }
    }

    /// 表单层的典型流程：先写草稿，再由草稿生成请求
    fn fill_draft(h: &Harness) -> (Draft, GenerationRequest) {
        let draft = h
            .orchestrator
            .drafts()
            .update_draft(DraftPatch {
                title: Some("Dino Days".to_string()),
                theme: Some("A dinosaur learns to bake bread".to_string()),
                page_count: Some(4),
                character_name: Some("Rex".to_string()),
                ..Default::default()
            })
            .unwrap();
        let request = draft.to_request().unwrap();
        (draft, request)
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_generation() {
        let book = FakeBookClient::sample_book("Dino Days", 4);
        let h = harness(
            FakeBookClient::new("job-1")
                .with_status(GenerationStatus::pending("job-1").with_progress(10))
                .with_status(GenerationStatus::generating("job-1", 60, "Drawing page 3"))
                .with_status(GenerationStatus::complete("job-1", Some(book.clone()))),
        );
        let (_, request) = fill_draft(&h);

        let result = h.orchestrator.generate(request).await.unwrap();

        assert_eq!(result, Some(book.clone()));
        let state = h.orchestrator.state();
        assert_eq!(state.phase, GenerationPhase::Complete);
        assert!(!state.is_generating);
        assert!(state.error.is_none());
        assert_eq!(state.progress, 100);
        assert_eq!(h.orchestrator.drafts().draft(), Draft::default());
        assert_eq!(h.store.load().unwrap(), Some(Draft::default()));
        assert_eq!(h.sink.book(), Some(book));
        assert_eq!(h.client.submit_calls(), 1);
        assert_eq!(h.orchestrator.current_job().unwrap().polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_preserves_draft() {
        let h = harness(
            FakeBookClient::new("job-1").with_submit_error(ApiError::service(402, "quota exceeded")),
        );
        let (draft, request) = fill_draft(&h);

        let err = h.orchestrator.generate(request).await.unwrap_err();

        assert!(matches!(err, GenerationError::Submission(_)));
        assert_eq!(err.to_string(), "quota exceeded");
        let state = h.orchestrator.state();
        assert_eq!(state.error.as_deref(), Some("quota exceeded"));
        assert!(!state.is_generating);
        assert_eq!(state.phase, GenerationPhase::Failed);
        assert_eq!(h.orchestrator.drafts().draft(), draft);
        assert_eq!(h.client.poll_calls(), 0);
        assert!(h.sink.book().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_failure_mid_poll() {
        let h = harness(
            FakeBookClient::new("job-1")
                .with_status(GenerationStatus::generating("job-1", 20, "Planning scenes"))
                .with_status(GenerationStatus::failed("job-1", "unsafe content detected")),
        );
        let (draft, request) = fill_draft(&h);

        let err = h.orchestrator.generate(request).await.unwrap_err();

        assert!(matches!(err, GenerationError::JobFailed(_)));
        assert_eq!(err.to_string(), "unsafe content detected");
        let state = h.orchestrator.state();
        assert_eq!(state.error.as_deref(), Some("unsafe content detected"));
        assert_eq!(state.progress, 20);
        assert!(!state.is_generating);
        assert_eq!(h.orchestrator.drafts().draft(), draft);
        assert!(h.sink.book().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_keeps_last_progress() {
        let h = harness(
            FakeBookClient::new("job-1")
                .with_status(GenerationStatus::generating("job-1", 20, "Planning scenes"))
                .with_status_error(ApiError::NetworkError("connection reset".into())),
        );
        let (draft, request) = fill_draft(&h);

        let err = h.orchestrator.generate(request).await.unwrap_err();

        assert!(matches!(err, GenerationError::PollingTransport(_)));
        let state = h.orchestrator.state();
        assert_eq!(state.progress, 20);
        assert_eq!(state.status_message, "Planning scenes");
        assert_eq!(h.orchestrator.drafts().draft(), draft);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_message_does_not_overwrite_status() {
        let h = harness(
            FakeBookClient::new("job-1")
                .with_status(GenerationStatus::generating("job-1", 30, "Drawing page 1"))
                .with_status(GenerationStatus::generating("job-1", 45, "")),
        );
        let (_, request) = fill_draft(&h);
        let mut updates = h.orchestrator.subscribe();

        let orchestrator = h.orchestrator.clone();
        let task = tokio::spawn(async move { orchestrator.generate(request).await });

        // 首轮 1s + 间隔 2s 后第二次轮询已生效
        tokio::time::sleep(Duration::from_millis(3500)).await;
        let state = updates.borrow_and_update().clone();
        assert_eq!(state.progress, 45);
        assert_eq!(state.status_message, "Drawing page 1");
        assert!(state.is_generating);

        h.orchestrator.cancel();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(GenerationError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_without_result_rejects() {
        let h = harness(
            FakeBookClient::new("job-1").with_status(GenerationStatus::complete("job-1", None)),
        );
        let (draft, request) = fill_draft(&h);

        let err = h.orchestrator.generate(request).await.unwrap_err();

        assert!(matches!(err, GenerationError::ProtocolViolation { .. }));
        assert!(h.orchestrator.state().error.is_some());
        assert!(h.sink.book().is_none());
        assert_eq!(h.orchestrator.drafts().draft(), draft);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let h = harness(FakeBookClient::new("job-1"));
        let (draft, request) = fill_draft(&h);

        let orchestrator = h.orchestrator.clone();
        let task = tokio::spawn(async move { orchestrator.generate(request).await });

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(h.orchestrator.is_generating());
        assert!(h.orchestrator.cancel());

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));

        let polls = h.client.poll_calls();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(h.client.poll_calls(), polls);

        let state = h.orchestrator.state();
        assert!(!state.is_generating);
        assert_eq!(state.error.as_deref(), Some("Generation cancelled"));
        assert_eq!(h.orchestrator.drafts().draft(), draft);
        assert!(!h.orchestrator.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_submission() {
        let h = harness(FakeBookClient::new("job-1").with_latency(Duration::from_secs(10)));
        let (_, request) = fill_draft(&h);

        let orchestrator = h.orchestrator.clone();
        let task = tokio::spawn(async move { orchestrator.generate(request).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(h.orchestrator.state().phase, GenerationPhase::Submitting);
        h.orchestrator.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
        assert_eq!(h.orchestrator.state().phase, GenerationPhase::Failed);
        assert_eq!(h.client.poll_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_generate_is_rejected() {
        let h = harness(FakeBookClient::new("job-1"));
        let (_, request) = fill_draft(&h);

        let orchestrator = h.orchestrator.clone();
        let first_request = request.clone();
        let first = tokio::spawn(async move { orchestrator.generate(first_request).await });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let before = h.orchestrator.state();

        let second = h.orchestrator.generate(request).await.unwrap();
        assert!(second.is_none());
        assert_eq!(h.orchestrator.state(), before);
        assert_eq!(h.client.submit_calls(), 1);

        h.orchestrator.cancel();
        assert!(first.await.unwrap().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_error() {
        let policy = PollPolicy {
            max_wait: Some(Duration::from_secs(60)),
            ..Default::default()
        };
        let h = harness_with_policy(FakeBookClient::new("job-1"), policy);
        let (draft, request) = fill_draft(&h);

        let err = h.orchestrator.generate(request).await.unwrap_err();

        assert!(matches!(err, GenerationError::Timeout { secs: 60 }));
        assert_eq!(
            h.orchestrator.state().error.as_deref(),
            Some("Generation timed out after 60s")
        );
        assert_eq!(h.orchestrator.drafts().draft(), draft);
    }

    #[tokio::test(start_paused = true)]
    async fn test_orchestrator_is_reusable_after_failure() {
        let book = FakeBookClient::sample_book("Dino Days", 4);
        let h = harness(
            FakeBookClient::new("job-1")
                .with_status(GenerationStatus::failed("job-1", ""))
                .with_status(GenerationStatus::complete("job-1", Some(book.clone()))),
        );
        let (_, request) = fill_draft(&h);

        let err = h.orchestrator.generate(request.clone()).await.unwrap_err();
        assert_eq!(err.to_string(), "Generation failed");

        let result = h.orchestrator.generate(request).await.unwrap();
        assert_eq!(result, Some(book));
        assert!(h.orchestrator.state().error.is_none());
        assert_eq!(h.client.submit_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_and_blocks_new_runs() {
        let parent = CancellationToken::new();
        let client = Arc::new(FakeBookClient::new("job-1"));
        let drafts = Arc::new(DraftSession::open(Arc::new(InMemoryDraftStore::new())).unwrap());
        let orchestrator = GenerationOrchestrator::new(
            client.clone(),
            drafts,
            Arc::new(ActiveBook::new()),
            PollPolicy::default(),
        )
        .with_cancellation(&parent)
        .arc();

        let request = GenerationRequest::new("Dino Days", "A dinosaur learns to bake");
        let running = orchestrator.clone();
        let pending = request.clone();
        let task = tokio::spawn(async move { running.generate(pending).await });

        tokio::time::sleep(Duration::from_secs(4)).await;
        parent.cancel();
        assert!(matches!(task.await.unwrap(), Err(GenerationError::Cancelled)));

        let err = orchestrator.generate(request).await.unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
        assert_eq!(client.submit_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_leaves_draft_untouched() {
        let h = harness(
            FakeBookClient::new("job-1").with_submit_error(ApiError::service(402, "quota exceeded")),
        );
        let before = h.orchestrator.drafts().draft();
        let request = GenerationRequest::new("Dino Days", "A dinosaur learns to bake bread");

        let err = h.orchestrator.generate(request).await.unwrap_err();

        assert!(matches!(err, GenerationError::Submission(_)));
        assert_eq!(h.orchestrator.drafts().draft(), before);
        assert_eq!(h.store.load().unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_generate_settles_state() {
        let h = harness(FakeBookClient::new("job-1"));
        let (draft, request) = fill_draft(&h);

        let orchestrator = h.orchestrator.clone();
        let task = tokio::spawn(async move { orchestrator.generate(request).await });

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(h.orchestrator.state().phase, GenerationPhase::Polling);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let state = h.orchestrator.state();
        assert_eq!(state.phase, GenerationPhase::Failed);
        assert!(!state.is_generating);
        assert_eq!(state.error.as_deref(), Some("Generation cancelled"));
        assert!(!h.orchestrator.is_generating());
        assert!(!h.orchestrator.cancel());
        assert_eq!(h.orchestrator.drafts().draft(), draft);

        let polls = h.client.poll_calls();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.client.poll_calls(), polls);
    }
}
