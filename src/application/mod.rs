//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（BookApi、DraftStore、ResultSink、Credentials）
//! - drafts: 会话内表单草稿
//! - generation: 生成任务状态机
//! - error: 应用层错误定义

pub mod drafts;
pub mod error;
pub mod generation;
pub mod ports;

pub use drafts::DraftSession;
pub use error::{GenerationError, JOB_FAILED_FALLBACK_MESSAGE, POLLING_FALLBACK_MESSAGE};
pub use generation::{
    GenerationOrchestrator, GenerationPhase, GenerationState, JobSubmitter, PollPolicy,
    RetryPolicy, StatusPoller,
};
pub use ports::{
    ApiError, BookApiPort, CredentialsPort, DraftStoreError, DraftStorePort, ResultSinkPort,
    GENERIC_REQUEST_FAILURE,
};
