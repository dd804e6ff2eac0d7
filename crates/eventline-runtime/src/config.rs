//! Runtime configuration.

use std::path::Path;

use eventline_events::DropFilter;
use eventline_queue::TieBreak;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Configuration for the runtime.
///
/// Drop sets are kept as value names so they can come from files or
/// flags; they are validated when the runtime is built, never at dispatch
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Ordering among events of equal priority.
    pub tie_break: TieBreak,
    /// Whether shutdown dispatches events still queued.
    pub drain_on_shutdown: bool,
    /// Capacity of the notification broadcast channel.
    pub notification_capacity: usize,
    /// Event type names to drop.
    pub drop_types: Vec<String>,
    /// Priority names to drop.
    pub drop_priorities: Vec<String>,
    /// Source names to drop.
    pub drop_sources: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::Fifo,
            drain_on_shutdown: true,
            notification_capacity: 256,
            drop_types: Vec::new(),
            drop_priorities: Vec::new(),
            drop_sources: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    /// Reads a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Sets the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Sets whether shutdown drains the queue.
    pub fn with_drain_on_shutdown(mut self, drain: bool) -> Self {
        self.drain_on_shutdown = drain;
        self
    }

    /// Sets the notification channel capacity.
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity;
        self
    }

    /// Adds an event type name to the drop set.
    pub fn with_drop_type(mut self, name: impl Into<String>) -> Self {
        self.drop_types.push(name.into());
        self
    }

    /// Adds a priority name to the drop set.
    pub fn with_drop_priority(mut self, name: impl Into<String>) -> Self {
        self.drop_priorities.push(name.into());
        self
    }

    /// Adds a source name to the drop set.
    pub fn with_drop_source(mut self, name: impl Into<String>) -> Self {
        self.drop_sources.push(name.into());
        self
    }

    /// Builds the drop filter, failing on unknown value names.
    pub fn drop_filter(&self) -> Result<DropFilter> {
        Ok(DropFilter::from_names(
            &self.drop_types,
            &self.drop_priorities,
            &self.drop_sources,
        )?)
    }
}
