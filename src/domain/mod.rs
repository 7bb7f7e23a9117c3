//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Book Context: 生成请求与生成结果
//! - Draft Context: 会话内表单草稿
//! - Job Context: 服务端生成任务状态

pub mod book;
pub mod draft;
pub mod job;
