//! Bounded mutation history for the state store.

use crate::constants::WILDCARD_KEY;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;

/// One effective mutation of the store
///
/// `None` means the key was absent on that side of the change. Wildcard
/// records (`key == "*"`) hold whole-store snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(key: &str, old_value: Option<Value>, new_value: Option<Value>) -> Self {
        Self {
            key: key.to_string(),
            old_value,
            new_value,
            timestamp: Utc::now(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.key == WILDCARD_KEY
    }
}

/// FIFO of history records that evicts the oldest record past `limit`
#[derive(Debug, Clone)]
pub struct History {
    records: VecDeque<HistoryRecord>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    pub fn push(&mut self, record: HistoryRecord) {
        if self.limit == 0 {
            return;
        }
        self.records.push_back(record);
        while self.records.len() > self.limit {
            self.records.pop_front();
        }
    }

    /// Remove and return the most recent record
    pub fn pop(&mut self) -> Option<HistoryRecord> {
        self.records.pop_back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records, oldest first
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_evicts_oldest_past_limit() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(HistoryRecord::new("k", Some(json!(i)), Some(json!(i + 1))));
        }

        assert_eq!(history.len(), 3);
        let records = history.records();
        assert_eq!(records[0].old_value, Some(json!(2)));
        assert_eq!(history.pop().and_then(|r| r.new_value), Some(json!(5)));
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = History::new(0);
        history.push(HistoryRecord::new("k", None, Some(json!(1))));
        assert!(history.is_empty());
    }

    #[test]
    fn test_wildcard_detection() {
        assert!(HistoryRecord::new("*", None, None).is_wildcard());
        assert!(!HistoryRecord::new("theme", None, None).is_wildcard());
    }
}
