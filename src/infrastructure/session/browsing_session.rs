//! Browsing Session - 浏览会话生命周期
//!
//! 会话目录 `<root>/<session-id>/` 内放草稿数据库；`end` 删除整个目录，
//! 保证草稿不会活过会话。会话持有根取消令牌，结束时终止所有进行中的生成。

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{DraftStoreError, DraftStorePort};
use crate::infrastructure::persistence::SledDraftStore;

const DRAFT_DB_NAME: &str = "draft.sled";

/// 浏览会话
#[derive(Debug)]
pub struct BrowsingSession {
    id: Uuid,
    dir: PathBuf,
    store: Arc<SledDraftStore>,
    token: CancellationToken,
    started_at: DateTime<Utc>,
}

impl BrowsingSession {
    /// 新建会话
    pub fn start<P: AsRef<Path>>(root: P) -> Result<Self, DraftStoreError> {
        let id = Uuid::new_v4();
        let dir = root.as_ref().join(id.to_string());
        std::fs::create_dir_all(&dir)?;

        let session = Self::open(id, dir)?;
        tracing::info!(session_id = %session.id, dir = %session.dir.display(), "Browsing session started");
        Ok(session)
    }

    /// 重新载入已有会话
    pub fn resume<P: AsRef<Path>>(root: P, id: &str) -> Result<Self, DraftStoreError> {
        let id = Uuid::parse_str(id.trim())
            .map_err(|_| DraftStoreError::SessionNotFound(id.to_string()))?;
        let dir = root.as_ref().join(id.to_string());
        if !dir.is_dir() {
            return Err(DraftStoreError::SessionNotFound(id.to_string()));
        }

        let session = Self::open(id, dir)?;
        tracing::info!(session_id = %session.id, "Browsing session resumed");
        Ok(session)
    }

    fn open(id: Uuid, dir: PathBuf) -> Result<Self, DraftStoreError> {
        let store = SledDraftStore::open(dir.join(DRAFT_DB_NAME))?.arc();
        Ok(Self {
            id,
            dir,
            store,
            token: CancellationToken::new(),
            started_at: Utc::now(),
        })
    }

    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 本次打开的时间（resume 时为重新载入的时间）
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn draft_store(&self) -> Arc<dyn DraftStorePort> {
        self.store.clone()
    }

    /// 会话根令牌，编排器以其子令牌运行
    pub fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    /// 结束会话：取消进行中的生成、关闭数据库、删除会话目录
    pub fn end(self) -> Result<(), DraftStoreError> {
        self.token.cancel();

        if let Err(e) = self.store.flush() {
            tracing::warn!(session_id = %self.id, error = %e, "Failed to flush draft store");
        }
        if Arc::strong_count(&self.store) > 1 {
            tracing::warn!(session_id = %self.id, "Draft store still referenced at session end");
        }
        drop(self.store);

        std::fs::remove_dir_all(&self.dir)?;
        tracing::info!(session_id = %self.id, "Browsing session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::{Draft, DraftPatch};
    use tempfile::tempdir;

    #[test]
    fn test_draft_survives_reload() {
        let root = tempdir().unwrap();
        let session = BrowsingSession::start(root.path()).unwrap();
        let id = session.id();

        let draft = Draft::default().merged(DraftPatch {
            title: Some("Space Otters".to_string()),
            ..Default::default()
        });
        session.draft_store().save(&draft).unwrap();
        drop(session);

        let resumed = BrowsingSession::resume(root.path(), &id).unwrap();
        assert_eq!(resumed.id(), id);
        assert_eq!(resumed.draft_store().load().unwrap(), Some(draft));
    }

    #[test]
    fn test_end_removes_directory() {
        let root = tempdir().unwrap();
        let session = BrowsingSession::start(root.path()).unwrap();
        let id = session.id();
        let dir = session.dir().to_path_buf();
        let token = session.cancellation().clone();
        session.draft_store().save(&Draft::default()).unwrap();

        session.end().unwrap();

        assert!(!dir.exists());
        assert!(token.is_cancelled());
        assert!(matches!(
            BrowsingSession::resume(root.path(), &id),
            Err(DraftStoreError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_resume_rejects_unknown_id() {
        let root = tempdir().unwrap();
        assert!(matches!(
            BrowsingSession::resume(root.path(), "../etc"),
            Err(DraftStoreError::SessionNotFound(_))
        ));
        assert!(matches!(
            BrowsingSession::resume(root.path(), &Uuid::new_v4().to_string()),
            Err(DraftStoreError::SessionNotFound(_))
        ));
    }
}
