//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod memory;
pub mod persistence;
pub mod session;

pub use adapters::{FakeBookClient, HttpBookClient, HttpBookClientConfig, StaticCredentials};
pub use memory::{ActiveBook, InMemoryDraftStore};
pub use persistence::sled::SledDraftStore;
pub use session::BrowsingSession;
