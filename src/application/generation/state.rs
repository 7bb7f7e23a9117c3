//! Generation State - 可观察的生成状态

use serde::Serialize;

use crate::domain::job::{GenerationStatus, JobId, JobState};

/// 尚未开始任何生成时的提示
pub const INITIAL_STATUS_MESSAGE: &str = "Starting...";

/// 提交任务时的提示
pub const QUEUING_STATUS_MESSAGE: &str = "Queuing job...";

/// 编排器状态机阶段
///
/// Complete / Failed 为终态，与 Idle 一样可以开始新的生成
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Complete,
    Failed,
}

impl GenerationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationPhase::Idle => "idle",
            GenerationPhase::Submitting => "submitting",
            GenerationPhase::Polling => "polling",
            GenerationPhase::Complete => "complete",
            GenerationPhase::Failed => "failed",
        }
    }

    /// 是否有生成在进行
    pub fn is_active(&self) -> bool {
        matches!(self, GenerationPhase::Submitting | GenerationPhase::Polling)
    }

    pub fn can_transition_to(&self, next: GenerationPhase) -> bool {
        use GenerationPhase::*;
        matches!(
            (self, next),
            (Idle | Complete | Failed, Submitting)
                | (Submitting, Polling | Failed)
                | (Polling, Polling | Complete | Failed)
        )
    }
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对外只读的生成状态快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationState {
    pub phase: GenerationPhase,
    pub is_generating: bool,
    pub progress: u8,
    pub status_message: String,
    pub error: Option<String>,
    pub job_id: Option<JobId>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            phase: GenerationPhase::Idle,
            is_generating: false,
            progress: 0,
            status_message: INITIAL_STATUS_MESSAGE.to_string(),
            error: None,
            job_id: None,
        }
    }
}

impl GenerationState {
    /// 进入 Submitting：重置进度、错误与提示
    pub(crate) fn begin(&mut self) {
        self.transition(GenerationPhase::Submitting);
        self.is_generating = true;
        self.error = None;
        self.progress = 0;
        self.status_message = QUEUING_STATUS_MESSAGE.to_string();
        self.job_id = None;
    }

    /// 提交成功，进入 Polling
    pub(crate) fn submitted(&mut self, job_id: &JobId) {
        self.transition(GenerationPhase::Polling);
        self.job_id = Some(job_id.clone());
    }

    /// 应用一次轮询结果；空消息不覆盖已有提示，failed 不覆盖进度
    pub(crate) fn apply_status(&mut self, status: &GenerationStatus) {
        if status.status != JobState::Failed {
            self.progress = status.progress;
        }
        if let Some(message) = status.message() {
            self.status_message = message.to_string();
        }
    }

    pub(crate) fn complete(&mut self) {
        self.transition(GenerationPhase::Complete);
        self.is_generating = false;
        self.error = None;
    }

    /// 失败时保留 progress / status_message，方便用户看到停在哪一步
    pub(crate) fn fail(&mut self, message: String) {
        self.transition(GenerationPhase::Failed);
        self.is_generating = false;
        self.error = Some(message);
    }

    fn transition(&mut self, next: GenerationPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::warn!(
                from = %self.phase,
                to = %next,
                "Unexpected generation phase transition"
            );
        }
        self.phase = next;
    }
}
