//! Event types for the pipeline.
//!
//! An [`Event`] is the unit of work. It is classified by an [`EventType`]
//! (which decides the handler), a [`Priority`] (which decides dequeue
//! order) and a [`Source`] (informational, usable by filters and
//! middleware).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// What occurred.
///
/// Every member needs a registered consumer to be deliverable; events of a
/// type without one are reported as unroutable at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A user logged in.
    Login,
    /// A user logged out.
    Logout,
    /// A purchase was made.
    Purchase,
    /// Newly introduced event kind.
    New,
    /// Unclassified event.
    Unknown,
}

impl EventType {
    /// All event types, in declaration order.
    pub const ALL: [EventType; 5] = [
        EventType::Login,
        EventType::Logout,
        EventType::Purchase,
        EventType::New,
        EventType::Unknown,
    ];

    /// Returns the display name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Login => "Login",
            EventType::Logout => "Logout",
            EventType::Purchase => "Purchase",
            EventType::New => "New",
            EventType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseError::EventType(s.to_string()))
    }
}

/// Urgency of an event.
///
/// Ordering follows [`Priority::rank`]: `High < Medium < Low < Zero`, and
/// the smallest rank is dequeued first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Most urgent.
    High,
    /// Normal urgency.
    #[default]
    Medium,
    /// Low urgency.
    Low,
    /// Least urgent; commonly dropped.
    Zero,
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Priority; 4] = [Priority::High, Priority::Medium, Priority::Low, Priority::Zero];

    /// Returns the numeric rank. Lower rank = more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::Zero => 4,
        }
    }

    /// Returns the display name of this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Zero => "Zero",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseError::Priority(s.to_string()))
    }
}

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Browser client.
    Web,
    /// Mobile client.
    Mobile,
    /// Programmatic API call.
    Api,
    /// Origin not known.
    #[default]
    Unknown,
}

impl Source {
    /// All sources, in declaration order.
    pub const ALL: [Source; 4] = [Source::Web, Source::Mobile, Source::Api, Source::Unknown];

    /// Returns the display name of this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Web => "Web",
            Source::Mobile => "Mobile",
            Source::Api => "API",
            Source::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Source::ALL
            .into_iter()
            .find(|src| src.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseError::Source(s.to_string()))
    }
}

/// A unit of work flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Urgency; the primary ordering key.
    pub priority: Priority,

    /// Type of the event; selects the handler.
    pub event_type: EventType,

    /// Opaque text payload.
    pub event_data: String,

    /// Origin of the event.
    pub event_source: Source,

    /// Set by middleware; absent until stamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_timestamp: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates a new event without a timestamp.
    pub fn new(
        event_type: EventType,
        priority: Priority,
        event_source: Source,
        event_data: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            event_type,
            event_data: event_data.into(),
            event_source,
            event_timestamp: None,
        }
    }

    /// Returns a one-line description of the classifying fields.
    pub fn summary(&self) -> String {
        format!(
            "{} priority: {} source: {}",
            self.event_type, self.priority, self.event_source
        )
    }

    /// Returns true if middleware has stamped this event.
    pub fn is_stamped(&self) -> bool {
        self.event_timestamp.is_some()
    }
}
