//! Book Context - Generation Request

use serde::{Deserialize, Serialize};

use super::{AgeRange, ArtStyle, BookError, PAGE_COUNT_RANGE};

const TITLE_LEN: (usize, usize) = (2, 80);
const THEME_LEN: (usize, usize) = (5, 300);
const CHARACTER_NAME_MAX: usize = 50;

/// 绘本生成请求
///
/// 提交前应通过 [`GenerationRequest::validate`]；编排器本身不做校验，
/// 由表单层保证。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub title: String,
    pub theme: String,
    pub page_count: u8,
    pub age_range: AgeRange,
    pub art_style: ArtStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
}

impl GenerationRequest {
    pub fn new(title: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            theme: theme.into(),
            page_count: 6,
            age_range: AgeRange::default(),
            art_style: ArtStyle::default(),
            character_name: None,
        }
    }

    pub fn with_page_count(mut self, page_count: u8) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn with_age_range(mut self, age_range: AgeRange) -> Self {
        self.age_range = age_range;
        self
    }

    pub fn with_art_style(mut self, art_style: ArtStyle) -> Self {
        self.art_style = art_style;
        self
    }

    pub fn with_character_name(mut self, name: impl Into<String>) -> Self {
        self.character_name = Some(name.into());
        self
    }

    /// 校验字段取值范围（长度按字符计）
    pub fn validate(&self) -> Result<(), BookError> {
        let title_len = self.title.trim().chars().count();
        if title_len < TITLE_LEN.0 || title_len > TITLE_LEN.1 {
            return Err(BookError::InvalidTitle {
                min: TITLE_LEN.0,
                max: TITLE_LEN.1,
            });
        }

        let theme_len = self.theme.trim().chars().count();
        if theme_len < THEME_LEN.0 || theme_len > THEME_LEN.1 {
            return Err(BookError::InvalidTheme {
                min: THEME_LEN.0,
                max: THEME_LEN.1,
            });
        }

        if !PAGE_COUNT_RANGE.contains(&self.page_count) {
            return Err(BookError::InvalidPageCount {
                min: *PAGE_COUNT_RANGE.start(),
                max: *PAGE_COUNT_RANGE.end(),
                actual: self.page_count,
            });
        }

        if let Some(name) = &self.character_name {
            if name.trim().chars().count() > CHARACTER_NAME_MAX {
                return Err(BookError::InvalidCharacterName {
                    max: CHARACTER_NAME_MAX,
                });
            }
        }

        Ok(())
    }
}
