//! Sled-based Draft Store Implementation
//!
//! 数据库位于浏览会话目录内，随会话一起销毁

use sled::Db;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{DraftStoreError, DraftStorePort};
use crate::domain::draft::{Draft, DRAFT_KEY};

/// Sled 草稿存储
///
/// 每次写入后立即落盘，进程被意外杀掉后 resume 仍能读回
#[derive(Debug)]
pub struct SledDraftStore {
    db: Db,
    path: PathBuf,
}

impl SledDraftStore {
    /// 打开（或创建）草稿数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DraftStoreError> {
        let path = path.as_ref().to_path_buf();
        let db = sled::Config::new()
            .path(&path)
            .flush_every_ms(None)
            .open()
            .map_err(|e| DraftStoreError::DatabaseError(e.to_string()))?;

        tracing::debug!(db_path = %path.display(), "SledDraftStore opened");

        Ok(Self { db, path })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), DraftStoreError> {
        self.db
            .flush()
            .map_err(|e| DraftStoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

impl DraftStorePort for SledDraftStore {
    fn load(&self) -> Result<Option<Draft>, DraftStoreError> {
        let value = self
            .db
            .get(DRAFT_KEY)
            .map_err(|e| DraftStoreError::DatabaseError(e.to_string()))?;

        match value {
            Some(bytes) => {
                let draft = bincode::deserialize::<Draft>(&bytes)
                    .map_err(|e| DraftStoreError::SerializationError(e.to_string()))?;
                Ok(Some(draft))
            }
            None => Ok(None),
        }
    }

    fn save(&self, draft: &Draft) -> Result<(), DraftStoreError> {
        let bytes = bincode::serialize(draft)
            .map_err(|e| DraftStoreError::SerializationError(e.to_string()))?;
        self.db
            .insert(DRAFT_KEY, bytes)
            .map_err(|e| DraftStoreError::DatabaseError(e.to_string()))?;
        self.flush()
    }

    fn remove(&self) -> Result<(), DraftStoreError> {
        self.db
            .remove(DRAFT_KEY)
            .map_err(|e| DraftStoreError::DatabaseError(e.to_string()))?;
        self.flush()
    }
}
