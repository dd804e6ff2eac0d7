//! Error types for ingress operations.

use eventline_models::ParseError;
use eventline_queue::QueueError;
use thiserror::Error;

/// Errors that can occur while configuring or feeding the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Filter configuration names a value that does not exist.
    #[error("invalid filter configuration: {0}")]
    InvalidFilter(#[from] ParseError),

    /// Queue rejected the event.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
