//! Auth Adapter - 请求凭证实现

mod static_credentials;

pub use static_credentials::StaticCredentials;
