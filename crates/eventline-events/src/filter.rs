//! Drop filter evaluated between the middleware stages.

use std::collections::HashSet;

use eventline_models::{Event, EventType, Priority, Source};

use crate::error::Result;

/// Deny sets deciding whether an event is dropped before queueing.
///
/// An event is dropped if its type, its priority, or its source appears
/// in the corresponding set. The three sets are independent; an empty
/// filter drops nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropFilter {
    /// Event types to drop.
    pub types: HashSet<EventType>,
    /// Priorities to drop.
    pub priorities: HashSet<Priority>,
    /// Sources to drop.
    pub sources: HashSet<Source>,
}

impl DropFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from value names, e.g. from configuration.
    ///
    /// Names are matched case-insensitively. Any name that does not denote
    /// a known value fails the whole construction.
    pub fn from_names<T, P, S>(types: T, priorities: P, sources: S) -> Result<Self>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let mut filter = Self::new();

        for name in types {
            filter.types.insert(name.as_ref().parse()?);
        }
        for name in priorities {
            filter.priorities.insert(name.as_ref().parse()?);
        }
        for name in sources {
            filter.sources.insert(name.as_ref().parse()?);
        }

        Ok(filter)
    }

    /// Adds an event type to the deny set.
    pub fn drop_type(mut self, event_type: EventType) -> Self {
        self.types.insert(event_type);
        self
    }

    /// Adds a priority to the deny set.
    pub fn drop_priority(mut self, priority: Priority) -> Self {
        self.priorities.insert(priority);
        self
    }

    /// Adds a source to the deny set.
    pub fn drop_source(mut self, source: Source) -> Self {
        self.sources.insert(source);
        self
    }

    /// Returns true if the event must be dropped.
    pub fn should_drop(&self, event: &Event) -> bool {
        self.types.contains(&event.event_type)
            || self.priorities.contains(&event.priority)
            || self.sources.contains(&event.event_source)
    }

    /// Returns true if no deny set has any member.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.priorities.is_empty() && self.sources.is_empty()
    }
}
