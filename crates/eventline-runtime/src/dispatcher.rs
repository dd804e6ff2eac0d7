//! Dispatch loop draining the queue into registered handlers.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use eventline_events::{Notification, NotificationBus};
use eventline_models::Event;
use eventline_queue::{EventQueue, QueueError};
use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::registry::ConsumerRegistry;

/// Result of dispatching a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The registered handler completed successfully.
    Handled,
    /// No handler was registered; the event was discarded.
    Unroutable,
    /// The handler returned an error or panicked.
    Failed(String),
}

/// Counters of dispatch outcomes since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events handled successfully.
    pub handled: u64,
    /// Events with no registered handler.
    pub unroutable: u64,
    /// Events whose handler failed.
    pub failed: u64,
}

impl DispatchStats {
    /// Total events taken off the queue.
    pub fn total(&self) -> u64 {
        self.handled + self.unroutable + self.failed
    }
}

#[derive(Debug, Default)]
struct Counters {
    handled: AtomicU64,
    unroutable: AtomicU64,
    failed: AtomicU64,
}

/// Removes events from the queue one at a time and invokes their handler.
///
/// States: WAITING (suspended in `remove_next`) and DISPATCHING (handler
/// awaited). Only one handler invocation is ever in flight.
#[derive(Debug)]
pub struct Dispatcher {
    queue: Arc<EventQueue>,
    registry: ConsumerRegistry,
    notifications: NotificationBus,
    counters: Counters,
}

impl Dispatcher {
    /// Creates a dispatcher over the given queue and registry.
    pub fn new(
        queue: Arc<EventQueue>,
        registry: ConsumerRegistry,
        notifications: NotificationBus,
    ) -> Self {
        Self {
            queue,
            registry,
            notifications,
            counters: Counters::default(),
        }
    }

    /// Waits for the next event and dispatches it.
    ///
    /// # Errors
    ///
    /// `QueueError::Closed` once the queue is closed and drained.
    pub async fn dispatch_next(&self) -> Result<DispatchOutcome> {
        let event = self.queue.remove_next().await?;
        Ok(self.dispatch(event).await)
    }

    /// Dispatches one event to its registered handler.
    ///
    /// Handler errors and panics are captured and reported; they never
    /// propagate to the caller.
    pub async fn dispatch(&self, event: Event) -> DispatchOutcome {
        let handler = match self.registry.get(event.event_type).await {
            Some(handler) => handler,
            None => {
                self.counters.unroutable.fetch_add(1, Ordering::Relaxed);
                self.notifications.emit(Notification::Unroutable { event });
                return DispatchOutcome::Unroutable;
            }
        };

        trace!(
            event_type = %event.event_type,
            handler = handler.name(),
            "dispatching"
        );

        let result = AssertUnwindSafe(handler.handle(event.event_type, &event.event_data))
            .catch_unwind()
            .await;

        let error = match result {
            Ok(Ok(())) => {
                self.counters.handled.fetch_add(1, Ordering::Relaxed);
                self.notifications.emit(Notification::Dispatched { event });
                return DispatchOutcome::Handled;
            }
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("handler panicked: {}", panic_message(panic.as_ref())),
        };

        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.notifications.emit(Notification::HandlerFailed {
            event,
            error: error.clone(),
        });
        DispatchOutcome::Failed(error)
    }

    /// Runs the dispatch loop.
    ///
    /// Exits when the queue is closed and drained, or when `shutdown`
    /// becomes true (or its sender is dropped). A stop request is observed
    /// only between dispatches; an in-flight handler always completes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        debug!("starting dispatch loop");

        loop {
            if *shutdown.borrow() {
                debug!("dispatch loop received shutdown signal");
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped");
                        break;
                    }
                }
                next = self.queue.remove_next() => match next {
                    Ok(event) => {
                        self.dispatch(event).await;
                    }
                    Err(QueueError::Closed) => {
                        debug!("queue closed and drained");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "queue failure, stopping dispatch loop");
                        break;
                    }
                },
            }
        }

        debug!(pending = self.queue.len(), "dispatch loop stopped");
    }

    /// Returns a snapshot of the outcome counters.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            handled: self.counters.handled.load(Ordering::Relaxed),
            unroutable: self.counters.unroutable.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Returns the registry handlers are looked up in.
    pub fn registry(&self) -> &ConsumerRegistry {
        &self.registry
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
