//! Draft Context - 表单草稿
//!
//! 草稿是生成请求的"部分值"，带固定默认值；只在浏览会话内持久化。

use serde::{Deserialize, Serialize};

use crate::domain::book::{AgeRange, ArtStyle, BookError, GenerationRequest};

/// 草稿的命名空间存储 key
pub const DRAFT_KEY: &str = "tailormade:book-draft";

/// 默认页数
pub const DEFAULT_PAGE_COUNT: u8 = 6;

/// 表单草稿
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub theme: String,
    pub page_count: u8,
    pub age_range: AgeRange,
    pub art_style: ArtStyle,
    /// 空字符串表示未设置
    pub character_name: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            title: String::new(),
            theme: String::new(),
            page_count: DEFAULT_PAGE_COUNT,
            age_range: AgeRange::Kids,
            art_style: ArtStyle::Standard,
            character_name: String::new(),
        }
    }
}

impl Draft {
    /// 浅合并：patch 中出现的字段整体覆盖，未出现的保持不变
    pub fn merge(&mut self, patch: DraftPatch) {
        let DraftPatch {
            title,
            theme,
            page_count,
            age_range,
            art_style,
            character_name,
        } = patch;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = theme {
            self.theme = v;
        }
        if let Some(v) = page_count {
            self.page_count = v;
        }
        if let Some(v) = age_range {
            self.age_range = v;
        }
        if let Some(v) = art_style {
            self.art_style = v;
        }
        if let Some(v) = character_name {
            self.character_name = v;
        }
    }

    pub fn merged(mut self, patch: DraftPatch) -> Self {
        self.merge(patch);
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// 转换为经过校验的生成请求
    pub fn to_request(&self) -> Result<GenerationRequest, BookError> {
        let character_name = self.character_name.trim();
        let request = GenerationRequest {
            title: self.title.trim().to_string(),
            theme: self.theme.trim().to_string(),
            page_count: self.page_count,
            age_range: self.age_range,
            art_style: self.art_style,
            character_name: (!character_name.is_empty()).then(|| character_name.to_string()),
        };
        request.validate()?;
        Ok(request)
    }
}

/// 草稿的部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub page_count: Option<u8>,
    #[serde(default)]
    pub age_range: Option<AgeRange>,
    #[serde(default)]
    pub art_style: Option<ArtStyle>,
    #[serde(default)]
    pub character_name: Option<String>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&GenerationRequest> for DraftPatch {
    /// 完整请求对应的 patch（覆盖全部字段）
    fn from(request: &GenerationRequest) -> Self {
        Self {
            title: Some(request.title.clone()),
            theme: Some(request.theme.clone()),
            page_count: Some(request.page_count),
            age_range: Some(request.age_range),
            art_style: Some(request.art_style),
            character_name: Some(request.character_name.clone().unwrap_or_default()),
        }
    }
}
