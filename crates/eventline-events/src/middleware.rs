//! Middleware applied to events around the filter decision.
//!
//! Middleware is a pure transform: it takes ownership of an event and
//! returns the (possibly mutated) event. It must not perform I/O.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use eventline_models::{Event, EventType, Priority, Source};

/// A pure event transform.
///
/// Implemented for any `Fn(Event) -> Event + Send + Sync`, so closures can
/// be used directly.
pub trait Middleware: Send + Sync {
    /// Transforms the event.
    fn apply(&self, event: Event) -> Event;

    /// Returns a short name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> Middleware for F
where
    F: Fn(Event) -> Event + Send + Sync,
{
    fn apply(&self, event: Event) -> Event {
        self(event)
    }
}

/// Ordered list of middleware, applied in insertion order.
///
/// An empty chain is the identity transform.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage, returning the chain.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.push(middleware);
        self
    }

    /// Appends a stage.
    pub fn push(&mut self, middleware: impl Middleware + 'static) {
        self.stages.push(Arc::new(middleware));
    }

    /// Runs every stage in order.
    pub fn apply(&self, event: Event) -> Event {
        self.stages
            .iter()
            .fold(event, |event, stage| stage.apply(event))
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| "None".to_string())
}

/// Re-tags events of one type with a fixed priority and source.
///
/// Intended as pre-filter middleware, so the filter sees the new values.
/// Other event types pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromoteType {
    /// Type to match.
    pub event_type: EventType,
    /// Priority assigned to matching events.
    pub priority: Priority,
    /// Source assigned to matching events.
    pub source: Source,
}

impl PromoteType {
    /// Creates a promotion rule.
    pub fn new(event_type: EventType, priority: Priority, source: Source) -> Self {
        Self {
            event_type,
            priority,
            source,
        }
    }
}

impl Middleware for PromoteType {
    fn apply(&self, mut event: Event) -> Event {
        if event.event_type != self.event_type {
            return event;
        }

        event.priority = self.priority;
        event.event_source = self.source;
        event.event_data = format!(
            "middleware applied before filtering to event data for {} date: {}",
            event.summary(),
            format_timestamp(event.event_timestamp)
        );
        event
    }

    fn name(&self) -> &str {
        "promote_type"
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Stamps the event with the current time and records the final field
/// values in the payload.
///
/// Intended as post-filter middleware.
#[derive(Clone)]
pub struct StampTimestamp {
    clock: Clock,
}

impl StampTimestamp {
    /// Creates a stamper using the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Utc::now),
        }
    }

    /// Creates a stamper with a custom clock.
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            clock: Arc::new(clock),
        }
    }
}

impl Default for StampTimestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StampTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StampTimestamp").finish_non_exhaustive()
    }
}

impl Middleware for StampTimestamp {
    fn apply(&self, mut event: Event) -> Event {
        let now = (self.clock)();
        event.event_timestamp = Some(now);
        event.event_data = format!(
            "middleware applied after filtering to event data for {} date: {}",
            event.summary(),
            format_timestamp(event.event_timestamp)
        );
        event
    }

    fn name(&self) -> &str {
        "stamp_timestamp"
    }
}
