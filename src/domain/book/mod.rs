//! Book Context - 绘本限界上下文
//!
//! 职责:
//! - 生成请求及其校验规则
//! - 生成结果（绘本 + 页面）
//! - 年龄段与画风等固定取值

mod entities;
mod errors;
mod request;
mod value_objects;

pub use entities::{GeneratedBook, PageResult};
pub use errors::BookError;
pub use request::GenerationRequest;
pub use value_objects::{AgeRange, ArtStyle, PAGE_COUNT_RANGE};
