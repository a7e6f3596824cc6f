use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    pub fn new(message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            message,
        }
    }
}

pub trait Loggable {
    fn add_log(&mut self, message: String);
    fn get_logs(&self) -> &[LogEntry];
}

/// Bounded in-memory log shared by the drag operation layer.
///
/// Every entry is mirrored to `tracing` at debug level; the ring keeps only
/// the most recent `capacity` entries for inspection by the caller.
#[derive(Debug, Clone)]
pub struct DebugLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl DebugLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Loggable for DebugLog {
    fn add_log(&mut self, message: String) {
        tracing::debug!(target: "goat::debug", "{}", message);
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry::new(message));
        self.entries.make_contiguous();
    }

    fn get_logs(&self) -> &[LogEntry] {
        self.entries.as_slices().0
    }
}
