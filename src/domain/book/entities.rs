//! Book Context - Entities

use serde::{Deserialize, Serialize};

/// 单页生成结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub page_number: u32,
    pub scene_description: String,
    /// 成品图地址
    pub image_url: String,
    /// 缩略图地址
    pub thumbnail_url: String,
}

/// 生成完成的绘本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedBook {
    pub book_id: String,
    pub title: String,
    pub theme: String,
    pub page_count: u32,
    /// 按页码排序
    pub pages: Vec<PageResult>,
    /// 可打印 PDF 地址
    pub pdf_url: String,
    pub created_at: String,
    pub user_uid: String,
}

impl GeneratedBook {
    /// 封面缩略图（第一页）
    pub fn cover_thumbnail(&self) -> Option<&str> {
        self.pages.first().map(|p| p.thumbnail_url.as_str())
    }
}
