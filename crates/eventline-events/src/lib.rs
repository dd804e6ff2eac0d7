//! Ingress side of the Eventline pipeline.
//!
//! This crate provides everything an event passes through before it is
//! queued:
//! - `MiddlewareChain` - ordered pure transforms, run before and after filtering
//! - `DropFilter` - deny sets over type, priority and source
//! - `Pipeline` - the single `submit` entry point tying them to the queue
//! - `NotificationBus` - broadcast of pipeline notifications to observers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use eventline_events::{DropFilter, NotificationBus, Pipeline, StampTimestamp, Submission};
//! use eventline_models::{Event, EventType, Priority, Source};
//! use eventline_queue::EventQueue;
//!
//! let queue = Arc::new(EventQueue::default());
//! let pipeline = Pipeline::new(Arc::clone(&queue), NotificationBus::default())
//!     .with_filter(DropFilter::new().drop_priority(Priority::Zero))
//!     .with_post_filter(StampTimestamp::new());
//!
//! let event = Event::new(EventType::Login, Priority::Zero, Source::Web, "ignored");
//! assert_eq!(pipeline.submit(event).unwrap(), Submission::Dropped);
//! ```

pub mod error;
pub mod filter;
pub mod middleware;
pub mod notification;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use filter::DropFilter;
pub use middleware::{Middleware, MiddlewareChain, PromoteType, StampTimestamp};
pub use notification::{Notification, NotificationBus};
pub use pipeline::{Pipeline, Submission};
