//! Dispatch runtime for Eventline.
//!
//! This crate provides the consuming side of the pipeline:
//! - `EventHandler` - async capability invoked per event type
//! - `ConsumerRegistry` - dynamic type-to-handler mapping, last write wins
//! - `Dispatcher` - sequential dispatch loop with per-event failure isolation
//! - `Runtime` - context object owning queue, pipeline, registry and the
//!   dispatch task
//!
//! # Example
//!
//! ```ignore
//! use eventline_events::{PromoteType, StampTimestamp};
//! use eventline_models::{Event, EventType, Priority, Source};
//! use eventline_runtime::{handler_fn, Runtime, RuntimeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RuntimeConfig::new()
//!         .with_drop_type("unknown")
//!         .with_drop_priority("zero");
//!
//!     let mut runtime = Runtime::builder(config)
//!         .pre_filter(PromoteType::new(EventType::New, Priority::High, Source::Api))
//!         .post_filter(StampTimestamp::new())
//!         .build()?;
//!
//!     runtime
//!         .register(EventType::Purchase, handler_fn(|_, payload| async move {
//!             println!("purchase: {}", payload);
//!             Ok(())
//!         }))
//!         .await;
//!
//!     // Watch the pipeline
//!     let mut notifications = runtime.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(n) = notifications.recv().await {
//!             println!("{}: {}", n.kind(), n.event().summary());
//!         }
//!     });
//!
//!     runtime.start()?;
//!     runtime.submit(Event::new(EventType::Purchase, Priority::High, Source::Web, "order-7"))?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Key Concepts
//!
//! ## Dispatch
//!
//! The dispatch loop takes one event at a time off the queue and awaits its
//! handler before taking the next. A type with no handler is reported as
//! unroutable and the event discarded. A handler that errors or panics is
//! reported and the loop carries on.
//!
//! ## Shutdown
//!
//! `Runtime::shutdown` closes the queue, so producers get a closed error,
//! then waits for the loop to drain remaining events (or stop right away
//! when `drain_on_shutdown` is off).

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;
pub mod runtime;

pub use config::RuntimeConfig;
pub use dispatcher::{DispatchOutcome, DispatchStats, Dispatcher};
pub use error::{Result, RuntimeError};
pub use handler::{handler_fn, EventHandler, FnHandler, HandlerError, HandlerResult};
pub use registry::ConsumerRegistry;
pub use runtime::{Runtime, RuntimeBuilder};
