//! Parsing error types for page extraction and catalog normalization
//!
//! None of these leave the crate as a hard failure: every strategy that
//! produces one degrades to "no result" for its own field or record.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No currency amount found for {field}")]
    NoCurrencyAmount { field: String, tried: usize },

    #[error("Platform table could not be loaded: {reason}")]
    TableLoadFailed { reason: String },

    #[error("Catalog item could not be decoded: {reason}")]
    ItemUnparseable { reason: String },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_pattern(pattern: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn table_load_failed(reason: impl std::fmt::Display) -> Self {
        Self::TableLoadFailed {
            reason: reason.to_string(),
        }
    }

    pub fn item_unparseable(reason: impl std::fmt::Display) -> Self {
        Self::ItemUnparseable {
            reason: reason.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
