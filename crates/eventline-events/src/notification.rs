//! Pipeline notifications for observers.

use eventline_models::Event;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Default capacity of the notification channel.
pub const DEFAULT_CAPACITY: usize = 256;

/// Notifications emitted as events move through the pipeline.
///
/// Serializes with a `kind` tag matching [`Notification::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// An event was submitted.
    Produced {
        /// The event as submitted.
        event: Event,
    },
    /// An event was rejected by the filter.
    Dropped {
        /// The event after pre-filter middleware.
        event: Event,
    },
    /// A handler finished processing an event.
    Dispatched {
        /// The event as handed to the handler.
        event: Event,
    },
    /// No handler was registered for the event's type.
    Unroutable {
        /// The discarded event.
        event: Event,
    },
    /// A handler returned an error or panicked.
    HandlerFailed {
        /// The event being handled.
        event: Event,
        /// Failure description.
        error: String,
    },
}

impl Notification {
    /// Returns the event this notification is about.
    pub fn event(&self) -> &Event {
        match self {
            Notification::Produced { event } => event,
            Notification::Dropped { event } => event,
            Notification::Dispatched { event } => event,
            Notification::Unroutable { event } => event,
            Notification::HandlerFailed { event, .. } => event,
        }
    }

    /// Returns a short label for the notification kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Produced { .. } => "produced",
            Notification::Dropped { .. } => "dropped",
            Notification::Dispatched { .. } => "dispatched",
            Notification::Unroutable { .. } => "unroutable",
            Notification::HandlerFailed { .. } => "handler_failed",
        }
    }

    /// Returns true if this is a handler failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Notification::HandlerFailed { .. })
    }
}

/// Broadcasts notifications to subscribers and mirrors them to the log.
///
/// Cloning yields another handle onto the same channel.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Creates a bus with the given channel capacity.
    ///
    /// Slow subscribers that fall more than `capacity` notifications behind
    /// observe a lag error and skip ahead.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes to notifications emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Logs the notification and delivers it to subscribers.
    ///
    /// Delivery is best effort; having no subscribers is not an error.
    pub fn emit(&self, notification: Notification) {
        let event = notification.event();
        match &notification {
            Notification::Produced { .. } => debug!(
                event_type = %event.event_type,
                priority = %event.priority,
                source = %event.event_source,
                payload = %event.event_data,
                "produced"
            ),
            Notification::Dropped { .. } => info!(
                event_type = %event.event_type,
                priority = %event.priority,
                source = %event.event_source,
                payload = %event.event_data,
                "filtered"
            ),
            Notification::Dispatched { .. } => info!(
                event_type = %event.event_type,
                priority = %event.priority,
                source = %event.event_source,
                payload = %event.event_data,
                "dispatched"
            ),
            Notification::Unroutable { .. } => info!(
                event_type = %event.event_type,
                priority = %event.priority,
                source = %event.event_source,
                payload = %event.event_data,
                "no consumer registered for event type"
            ),
            Notification::HandlerFailed { error, .. } => warn!(
                event_type = %event.event_type,
                priority = %event.priority,
                source = %event.event_source,
                payload = %event.event_data,
                error = %error,
                "handler failed"
            ),
        }

        let _ = self.tx.send(notification);
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
