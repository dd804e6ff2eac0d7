//! Core data models for Eventline.
//!
//! This crate provides the fundamental data types that flow through the
//! event pipeline: the event itself and the closed tag sets used to
//! classify, order and route it.

pub mod builders;
pub mod error;
pub mod event;

// Re-export main types
pub use builders::EventBuilder;
pub use error::ParseError;
pub use event::{Event, EventType, Priority, Source};
