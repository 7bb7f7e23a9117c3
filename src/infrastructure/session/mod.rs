//! Session - 浏览会话

mod browsing_session;

pub use browsing_session::BrowsingSession;
