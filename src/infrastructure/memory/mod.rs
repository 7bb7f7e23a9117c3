//! Memory Layer - In-Memory State Management
//!
//! 草稿的内存存储与当前绘本的查看状态

mod active_book;
mod draft_store;

pub use active_book::ActiveBook;
pub use draft_store::InMemoryDraftStore;
