//! Error types for queue operations.

use thiserror::Error;

/// Errors that can occur during queue operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Queue was closed; no further inserts, and removal fails once drained.
    #[error("queue closed")]
    Closed,

    /// Unrecognised tie-break policy name.
    #[error("invalid tie-break policy: {0}")]
    InvalidTieBreak(String),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type alias for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
