//! In-Memory Draft Store Implementation

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{DraftStoreError, DraftStorePort};
use crate::domain::draft::{Draft, DRAFT_KEY};

/// 内存草稿存储
///
/// 进程结束即丢失，用于测试与临时会话
pub struct InMemoryDraftStore {
    entries: DashMap<String, Draft>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStorePort for InMemoryDraftStore {
    fn load(&self) -> Result<Option<Draft>, DraftStoreError> {
        Ok(self.entries.get(DRAFT_KEY).map(|d| d.clone()))
    }

    fn save(&self, draft: &Draft) -> Result<(), DraftStoreError> {
        self.entries.insert(DRAFT_KEY.to_string(), draft.clone());
        tracing::trace!(key = DRAFT_KEY, "Draft saved");
        Ok(())
    }

    fn remove(&self) -> Result<(), DraftStoreError> {
        self.entries.remove(DRAFT_KEY);
        Ok(())
    }
}
