//! Active Book - 当前查看/涂色的绘本
//!
//! 生成成功后的结果接收方，维护翻页状态

use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::ports::ResultSinkPort;
use crate::domain::book::{GeneratedBook, PageResult};

#[derive(Debug, Default)]
struct Viewer {
    book: Option<GeneratedBook>,
    page_index: usize,
}

impl Viewer {
    fn total_pages(&self) -> usize {
        self.book.as_ref().map(|b| b.pages.len()).unwrap_or(0)
    }
}

/// 当前绘本
///
/// 页码下标始终落在 `0..total_pages`（无绘本时为 0）
#[derive(Debug, Default)]
pub struct ActiveBook {
    viewer: Mutex<Viewer>,
}

impl ActiveBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn lock(&self) -> MutexGuard<'_, Viewer> {
        self.viewer.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn book(&self) -> Option<GeneratedBook> {
        self.lock().book.clone()
    }

    /// 设置绘本并回到第一页
    pub fn set_book(&self, book: GeneratedBook) {
        let mut viewer = self.lock();
        viewer.book = Some(book);
        viewer.page_index = 0;
    }

    pub fn current_page_index(&self) -> usize {
        self.lock().page_index
    }

    pub fn current_page(&self) -> Option<PageResult> {
        let viewer = self.lock();
        viewer
            .book
            .as_ref()
            .and_then(|b| b.pages.get(viewer.page_index))
            .cloned()
    }

    pub fn total_pages(&self) -> usize {
        self.lock().total_pages()
    }

    pub fn can_go_next(&self) -> bool {
        let viewer = self.lock();
        viewer.page_index + 1 < viewer.total_pages()
    }

    pub fn can_go_prev(&self) -> bool {
        self.lock().page_index > 0
    }

    /// 已是最后一页时不动，返回是否翻页
    pub fn next_page(&self) -> bool {
        let mut viewer = self.lock();
        if viewer.page_index + 1 < viewer.total_pages() {
            viewer.page_index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&self) -> bool {
        let mut viewer = self.lock();
        if viewer.page_index > 0 {
            viewer.page_index -= 1;
            true
        } else {
            false
        }
    }

    /// 越界下标被忽略
    pub fn go_to_page(&self, index: usize) -> bool {
        let mut viewer = self.lock();
        if index < viewer.total_pages() {
            viewer.page_index = index;
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        let mut viewer = self.lock();
        viewer.book = None;
        viewer.page_index = 0;
    }
}

impl ResultSinkPort for ActiveBook {
    fn publish(&self, book: &GeneratedBook) {
        tracing::info!(
            book_id = %book.book_id,
            pages = book.pages.len(),
            "Book ready"
        );
        self.set_book(book.clone());
    }
}
