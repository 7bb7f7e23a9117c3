//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod book_api;
mod credentials;
mod draft_store;
mod result_sink;

pub use book_api::{ApiError, BookApiPort, GENERIC_REQUEST_FAILURE};
pub use credentials::CredentialsPort;
pub use draft_store::{DraftStoreError, DraftStorePort};
pub use result_sink::ResultSinkPort;
