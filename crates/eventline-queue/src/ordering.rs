//! Dequeue ordering for queued events.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use eventline_models::Event;
use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// How events of equal priority are ordered.
///
/// Priority rank is always the primary key. Both policies are total: a
/// final comparison on the insertion sequence number breaks any remaining
/// tie, so no two queued events ever compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Insertion order within a priority.
    #[default]
    Fifo,
    /// Compare event type, payload, source, then timestamp.
    ///
    /// Type and source compare by display name; an absent timestamp sorts
    /// before any present one.
    Fields,
}

impl TieBreak {
    /// Returns the config name of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::Fifo => "fifo",
            TieBreak::Fields => "fields",
        }
    }

    /// Compares two events of equal priority. `Less` dequeues first.
    fn compare_fields(a: &Event, b: &Event) -> Ordering {
        a.event_type
            .as_str()
            .cmp(b.event_type.as_str())
            .then_with(|| a.event_data.cmp(&b.event_data))
            .then_with(|| a.event_source.as_str().cmp(b.event_source.as_str()))
            .then_with(|| a.event_timestamp.cmp(&b.event_timestamp))
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieBreak {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(TieBreak::Fifo),
            "fields" => Ok(TieBreak::Fields),
            _ => Err(QueueError::InvalidTieBreak(s.to_string())),
        }
    }
}

/// Wrapper for Event that implements dequeue ordering for BinaryHeap.
///
/// # Ordering Rules
///
/// 1. Lower priority rank comes first (High > Medium > Low > Zero)
/// 2. For same priority, the configured `TieBreak` decides
/// 3. Remaining ties go to the earlier insertion
///
/// This is inverted because BinaryHeap is a max-heap, but we want
/// the most urgent event on top.
#[derive(Debug, Clone)]
pub(crate) struct QueuedEvent {
    pub(crate) seq: u64,
    pub(crate) tie_break: TieBreak,
    pub(crate) event: Event,
}

impl QueuedEvent {
    pub(crate) fn new(seq: u64, tie_break: TieBreak, event: Event) -> Self {
        Self {
            seq,
            tie_break,
            event,
        }
    }

    /// Dequeue order; `Less` means `self` leaves the queue first.
    fn dequeue_cmp(&self, other: &Self) -> Ordering {
        self.event
            .priority
            .cmp(&other.event.priority)
            .then_with(|| match self.tie_break {
                TieBreak::Fifo => Ordering::Equal,
                TieBreak::Fields => TieBreak::compare_fields(&self.event, &other.event),
            })
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse because BinaryHeap is max-heap
        other.dequeue_cmp(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use eventline_models::{EventType, Priority, Source};

    fn queued(seq: u64, tie_break: TieBreak, event: Event) -> QueuedEvent {
        QueuedEvent::new(seq, tie_break, event)
    }

    #[test]
    fn test_priority_dominates() {
        let urgent = queued(
            9,
            TieBreak::Fifo,
            Event::new(EventType::Unknown, Priority::High, Source::Web, "z"),
        );
        let lazy = queued(
            0,
            TieBreak::Fifo,
            Event::new(EventType::Login, Priority::Low, Source::Api, "a"),
        );

        assert_eq!(urgent.dequeue_cmp(&lazy), Ordering::Less);
        // Max-heap order: the urgent event is the "greater" one
        assert!(urgent > lazy);
    }

    #[test]
    fn test_fifo_ignores_fields() {
        let first = queued(
            1,
            TieBreak::Fifo,
            Event::new(EventType::Purchase, Priority::Medium, Source::Web, "z"),
        );
        let second = queued(
            2,
            TieBreak::Fifo,
            Event::new(EventType::Login, Priority::Medium, Source::Api, "a"),
        );

        assert_eq!(first.dequeue_cmp(&second), Ordering::Less);
    }

    #[test]
    fn test_fields_order_by_type_name() {
        // "Logout" < "New" < "Purchase" by name
        let purchase = queued(
            1,
            TieBreak::Fields,
            Event::new(EventType::Purchase, Priority::Low, Source::Web, "a"),
        );
        let new = queued(
            2,
            TieBreak::Fields,
            Event::new(EventType::New, Priority::Low, Source::Web, "a"),
        );

        assert_eq!(new.dequeue_cmp(&purchase), Ordering::Less);
    }

    #[test]
    fn test_fields_then_data_then_source() {
        let a = queued(
            5,
            TieBreak::Fields,
            Event::new(EventType::Login, Priority::Low, Source::Web, "alpha"),
        );
        let b = queued(
            1,
            TieBreak::Fields,
            Event::new(EventType::Login, Priority::Low, Source::Api, "beta"),
        );
        assert_eq!(a.dequeue_cmp(&b), Ordering::Less);

        let web = queued(
            1,
            TieBreak::Fields,
            Event::new(EventType::Login, Priority::Low, Source::Web, "same"),
        );
        let api = queued(
            2,
            TieBreak::Fields,
            Event::new(EventType::Login, Priority::Low, Source::Api, "same"),
        );
        // "API" < "Web"
        assert_eq!(api.dequeue_cmp(&web), Ordering::Less);
    }

    #[test]
    fn test_fields_missing_timestamp_first() {
        let mut stamped = Event::new(EventType::Login, Priority::Low, Source::Web, "same");
        stamped.event_timestamp = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let bare = Event::new(EventType::Login, Priority::Low, Source::Web, "same");

        let stamped = queued(1, TieBreak::Fields, stamped);
        let bare = queued(2, TieBreak::Fields, bare);

        assert_eq!(bare.dequeue_cmp(&stamped), Ordering::Less);
    }

    #[test]
    fn test_identical_fields_fall_back_to_sequence() {
        let event = Event::new(EventType::Login, Priority::Low, Source::Web, "same");
        let first = queued(3, TieBreak::Fields, event.clone());
        let second = queued(4, TieBreak::Fields, event);

        assert_eq!(first.dequeue_cmp(&second), Ordering::Less);
        assert_ne!(first, second);
    }

    #[test]
    fn test_tie_break_parse() {
        assert_eq!("FIFO".parse::<TieBreak>().unwrap(), TieBreak::Fifo);
        assert_eq!("fields".parse::<TieBreak>().unwrap(), TieBreak::Fields);
        assert!(matches!(
            "random".parse::<TieBreak>(),
            Err(QueueError::InvalidTieBreak(_))
        ));
        assert_eq!(TieBreak::default(), TieBreak::Fifo);
    }
}
