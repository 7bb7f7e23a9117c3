//! Generation - 异步生成任务的编排
//!
//! 包含：
//! - submitter: 提交任务
//! - poller: 轮询任务状态
//! - state: 可观察状态
//! - orchestrator: 状态机主体

mod orchestrator;
mod poller;
mod state;
mod submitter;

pub use orchestrator::GenerationOrchestrator;
pub use poller::{PollPolicy, RetryPolicy, StatusPoller};
pub use state::{
    GenerationPhase, GenerationState, INITIAL_STATUS_MESSAGE, QUEUING_STATUS_MESSAGE,
};
pub use submitter::JobSubmitter;
