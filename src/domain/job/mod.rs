//! Job Context - 服务端生成任务
//!
//! 职责:
//! - 任务标识与服务端状态
//! - 轮询返回的状态快照
//! - 客户端持有的任务句柄

mod handle;
mod status;
mod value_objects;

pub use handle::JobHandle;
pub use status::GenerationStatus;
pub use value_objects::{JobId, JobState};
