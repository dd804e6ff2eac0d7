//! Error types for model parsing.

use thiserror::Error;

/// Errors raised when text does not name a known model value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown event type name.
    #[error("unknown event type: {0}")]
    EventType(String),

    /// Unknown priority name.
    #[error("unknown priority: {0}")]
    Priority(String),

    /// Unknown source name.
    #[error("unknown source: {0}")]
    Source(String),
}
