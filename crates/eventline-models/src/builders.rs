//! Builder patterns for events.

use chrono::{DateTime, Utc};

use crate::event::{Event, EventType, Priority, Source};

/// Builder for creating Event instances with a fluent API.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event_type: EventType,
    priority: Option<Priority>,
    source: Option<Source>,
    data: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl EventBuilder {
    /// Creates a new EventBuilder for the given type.
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            priority: None,
            source: None,
            data: None,
            timestamp: None,
        }
    }

    /// Sets the priority (defaults to `Medium`).
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the source (defaults to `Unknown`).
    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the payload.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the timestamp.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builds the Event.
    pub fn build(self) -> Event {
        Event {
            priority: self.priority.unwrap_or_default(),
            event_type: self.event_type,
            event_data: self
                .data
                .unwrap_or_else(|| format!("Event Data for {}", self.event_type)),
            event_source: self.source.unwrap_or_default(),
            event_timestamp: self.timestamp,
        }
    }
}

/// Convenience methods on Event for creating builders.
impl Event {
    /// Creates a builder for a new event.
    pub fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }
}
