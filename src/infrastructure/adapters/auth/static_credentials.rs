//! Static Credentials - 配置注入的固定 token
//!
//! 登出后 token 被丢弃，后续请求不再携带 Authorization

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::application::ports::CredentialsPort;

pub struct StaticCredentials {
    token: RwLock<Option<String>>,
    signed_out: AtomicBool,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_option(Some(token.into()))
    }

    /// 无 token（本地开发服务不校验时使用）
    pub fn anonymous() -> Self {
        Self::from_option(None)
    }

    /// 空白 token 视为未登录
    pub fn from_option(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self {
            token: RwLock::new(token),
            signed_out: AtomicBool::new(false),
        }
    }

    pub fn is_signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialsPort for StaticCredentials {
    async fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn sign_out(&self) {
        let mut token = self.token.write().unwrap_or_else(|e| e.into_inner());
        *token = None;
        if !self.signed_out.swap(true, Ordering::SeqCst) {
            tracing::warn!("Credentials rejected, signed out");
        }
    }
}
