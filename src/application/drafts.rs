//! Draft Session - 表单草稿的读写入口
//!
//! 内存中保存当前草稿，每次变更同步写入会话级 DraftStore

use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::ports::{DraftStoreError, DraftStorePort};
use crate::domain::draft::{Draft, DraftPatch};

/// 草稿会话
///
/// 表单的唯一数据源；合并与落盘在同一把锁内完成，保证逐字段 last-write-wins
pub struct DraftSession {
    store: Arc<dyn DraftStorePort>,
    current: Mutex<Draft>,
}

impl DraftSession {
    /// 打开草稿会话，存储中已有草稿时恢复它
    pub fn open(store: Arc<dyn DraftStorePort>) -> Result<Self, DraftStoreError> {
        let restored = store.load()?;
        if restored.is_some() {
            tracing::info!("Restored draft from browsing session");
        }
        Ok(Self {
            store,
            current: Mutex::new(restored.unwrap_or_default()),
        })
    }

    /// 当前草稿
    pub fn draft(&self) -> Draft {
        self.lock().clone()
    }

    /// 浅合并字段更新并持久化
    pub fn update_draft(&self, patch: DraftPatch) -> Result<Draft, DraftStoreError> {
        let mut current = self.lock();
        let next = current.clone().merged(patch);
        self.store.save(&next)?;
        *current = next.clone();
        tracing::debug!(title = %next.title, page_count = next.page_count, "Draft updated");
        Ok(next)
    }

    /// 重置为默认值
    pub fn clear_draft(&self) -> Result<(), DraftStoreError> {
        let mut current = self.lock();
        let cleared = Draft::default();
        self.store.save(&cleared)?;
        *current = cleared;
        tracing::debug!("Draft cleared");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Draft> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
