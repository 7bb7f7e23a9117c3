//! Book Context - Value Objects

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// 允许的页数范围
pub const PAGE_COUNT_RANGE: RangeInclusive<u8> = 2..=12;

/// 目标年龄段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "3-5")]
    Toddler,
    #[default]
    #[serde(rename = "6-9")]
    Kids,
    #[serde(rename = "10-12")]
    Tweens,
}

impl AgeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRange::Toddler => "3-5",
            AgeRange::Kids => "6-9",
            AgeRange::Tweens => "10-12",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "3-5" => Some(AgeRange::Toddler),
            "6-9" => Some(AgeRange::Kids),
            "10-12" => Some(AgeRange::Tweens),
            _ => None,
        }
    }

    /// 展示用标签
    pub fn label(&self) -> &'static str {
        match self {
            AgeRange::Toddler => "Ages 3-5",
            AgeRange::Kids => "Ages 6-9",
            AgeRange::Tweens => "Ages 10-12",
        }
    }
}

impl std::fmt::Display for AgeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 线稿风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtStyle {
    /// 粗线条、大色块（3-5 岁）
    Simple,
    /// 常规涂色书线条（6-9 岁）
    #[default]
    Standard,
    /// 细线条、更多细节（10 岁以上）
    Detailed,
}

impl ArtStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtStyle::Simple => "simple",
            ArtStyle::Standard => "standard",
            ArtStyle::Detailed => "detailed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(ArtStyle::Simple),
            "standard" => Some(ArtStyle::Standard),
            "detailed" => Some(ArtStyle::Detailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_range_wire_format() {
        assert_eq!(serde_json::to_string(&AgeRange::Tweens).unwrap(), "\"10-12\"");
        let parsed: AgeRange = serde_json::from_str("\"3-5\"").unwrap();
        assert_eq!(parsed, AgeRange::Toddler);
        assert!(serde_json::from_str::<AgeRange>("\"13-18\"").is_err());
    }

    #[test]
    fn test_art_style_wire_format() {
        assert_eq!(serde_json::to_string(&ArtStyle::Detailed).unwrap(), "\"detailed\"");
        assert_eq!(ArtStyle::from_str("simple"), Some(ArtStyle::Simple));
        assert_eq!(ArtStyle::from_str("sketchy"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(AgeRange::default(), AgeRange::Kids);
        assert_eq!(ArtStyle::default(), ArtStyle::Standard);
    }
}
