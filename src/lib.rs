//! Tailormade - 绘本生成客户端核心
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 生成请求、生成结果
//! - Draft Context: 表单草稿
//! - Job Context: 任务 id 与状态
//!
//! 应用层 (application/):
//! - Ports: 端口定义（BookApi, DraftStore, ResultSink, Credentials）
//! - Generation: 提交、轮询与生成状态机
//! - Drafts: 会话内草稿
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 生成服务客户端、脚本化客户端、凭证
//! - Memory: 内存草稿存储、当前绘本
//! - Persistence: Sled 草稿存储
//! - Session: 浏览会话生命周期

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
