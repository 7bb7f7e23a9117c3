//! Sled 存储实现

mod draft_store;

pub use draft_store::SledDraftStore;
