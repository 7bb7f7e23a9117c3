//! Book Adapter - 生成服务客户端实现

mod fake_book_client;
mod http_book_client;

pub use fake_book_client::FakeBookClient;
pub use http_book_client::*;
