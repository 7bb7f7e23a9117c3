//! Draft Store Port - 会话草稿存储
//!
//! 草稿只在浏览会话内持久化，会话结束即销毁

use thiserror::Error;

use crate::domain::draft::Draft;

/// Draft Store 错误
#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Browsing session not found: {0}")]
    SessionNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DraftStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

/// Draft Store Port
///
/// 单一命名空间 key 下保存一份草稿
pub trait DraftStorePort: Send + Sync {
    /// 读取草稿，不存在时返回 None
    fn load(&self) -> Result<Option<Draft>, DraftStoreError>;

    /// 覆盖保存草稿
    fn save(&self, draft: &Draft) -> Result<(), DraftStoreError>;

    /// 删除草稿
    fn remove(&self) -> Result<(), DraftStoreError>;
}
