use super::action::ActionKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub action: ActionKind,
    pub score: f64,
    pub delta: Option<f64>,
    pub at: DateTime<Utc>,
}

/// Completed runs, newest first. Session scoped and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RunHistory {
    entries: VecDeque<HistoryEntry>,
}

impl RunHistory {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn has_run(&self, action: ActionKind) -> bool {
        self.entries.iter().any(|entry| entry.action == action)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(score: f64) -> HistoryEntry {
        HistoryEntry {
            action: ActionKind::Audit,
            score,
            delta: None,
            at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn keeps_ten_newest_entries() {
        let mut history = RunHistory::default();
        for score in 0..11 {
            history.push(entry(score as f64));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.latest().map(|entry| entry.score), Some(10.0));
        assert_eq!(history.iter().last().map(|entry| entry.score), Some(1.0));
    }

    #[test]
    fn clear_forgets_which_actions_ran() {
        let mut history = RunHistory::default();
        history.push(entry(50.0));
        assert!(history.has_run(ActionKind::Audit));
        history.clear();
        assert!(history.is_empty());
        assert!(!history.has_run(ActionKind::Audit));
    }
}
