//! Async priority event queue for Eventline.
//!
//! This crate provides the `EventQueue` that sits between ingress and the
//! dispatch loop:
//! - Priority ordering using `BinaryHeap` with custom `Ord`
//! - Explicit, total tie-break policy (`TieBreak`) among equal priorities
//! - `remove_next` suspends the calling task until an event is available
//! - Close-then-drain semantics for graceful shutdown
//!
//! # Example
//!
//! ```no_run
//! use eventline_models::{Event, EventType, Priority, Source};
//! use eventline_queue::{EventQueue, TieBreak};
//!
//! # async fn demo() -> eventline_queue::Result<()> {
//! let queue = EventQueue::new(TieBreak::Fifo);
//!
//! queue.insert(Event::new(EventType::Login, Priority::Low, Source::Web, "a"))?;
//! queue.insert(Event::new(EventType::Purchase, Priority::High, Source::Api, "b"))?;
//!
//! // High priority comes out first
//! let next = queue.remove_next().await?;
//! assert_eq!(next.event_type, EventType::Purchase);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ordering;
pub mod queue;

pub use error::{QueueError, Result};
pub use ordering::TieBreak;
pub use queue::EventQueue;
