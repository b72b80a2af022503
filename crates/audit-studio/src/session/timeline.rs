use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

pub const TIMELINE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Narrative event log, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    entries: VecDeque<TimelineEntry>,
}

impl Timeline {
    pub fn record(&mut self, at: DateTime<Utc>, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "timeline");
        self.entries.push_front(TimelineEntry { at, message });
        self.entries.truncate(TIMELINE_CAPACITY);
    }

    pub fn entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.message.as_str())
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(|entry| entry.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
