//! Credentials Port - 请求凭证

use async_trait::async_trait;

/// Credentials Port
///
/// 传输层在每次请求前取 token；收到 401 时强制登出
#[async_trait]
pub trait CredentialsPort: Send + Sync {
    /// 当前的 bearer token，未登录时为 None
    async fn bearer_token(&self) -> Option<String>;

    /// 强制登出
    fn sign_out(&self);
}
