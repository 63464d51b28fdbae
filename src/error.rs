//! Domain error type
//!
//! Command handlers use `anyhow` with context; this enum covers the failures
//! that callers match on or that become error result codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeadlinkError {
    #[error("invalid {option}: {value}")]
    InvalidOption { option: &'static str, value: String },

    #[error("not an HTML document: {0}")]
    NotHtml(String),

    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

impl HeadlinkError {
    /// Stable code used when this error is emitted as a result item
    pub fn code(&self) -> &'static str {
        match self {
            HeadlinkError::InvalidOption { .. } => "INVALID_OPTION",
            HeadlinkError::NotHtml(_) => "NOT_HTML",
            HeadlinkError::Unreadable { .. } => "READ_FAILED",
        }
    }
}
