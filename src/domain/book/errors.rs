//! Book Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("Title must be between {min} and {max} characters")]
    InvalidTitle { min: usize, max: usize },

    #[error("Theme must be between {min} and {max} characters")]
    InvalidTheme { min: usize, max: usize },

    #[error("Page count must be between {min} and {max}, got {actual}")]
    InvalidPageCount { min: u8, max: u8, actual: u8 },

    #[error("Character name must be at most {max} characters")]
    InvalidCharacterName { max: usize },
}
