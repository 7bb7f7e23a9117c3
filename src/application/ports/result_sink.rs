//! Result Sink Port - 生成结果的接收方

use crate::domain::book::GeneratedBook;

/// Result Sink Port
///
/// 生成成功后接收绘本用于展示
pub trait ResultSinkPort: Send + Sync {
    fn publish(&self, book: &GeneratedBook);
}
