//! Expression history kept by "compute and remember" plugins.
//!
//! Entries are kept in insertion order. Reads scan from the newest entry
//! backwards and stop after `scan_limit` entries have been looked at, so an
//! older match outside that window is not returned even when the window
//! produced fewer matches than the limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

pub const DEFAULT_SCAN_LIMIT: usize = 500;
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
    pub added_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Case-sensitive containment on either side of the entry.
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        self.expression.contains(filter) || self.result.contains(filter)
    }
}

/// Bounded, insertion-ordered history owned by one plugin instance.
///
/// All access goes through a single mutex, so appends from action handlers
/// and scans from query handlers never interleave.
#[derive(Debug)]
pub struct HistoryStore {
    entries: Mutex<VecDeque<HistoryEntry>>,
    scan_limit: usize,
    max_entries: usize,
}

impl HistoryStore {
    #[must_use]
    pub fn new(scan_limit: usize, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            scan_limit,
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        // A panic while holding the lock cannot leave the deque half-updated
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record a new entry stamped with the current time.
    pub fn append(&self, expression: impl Into<String>, result: impl Into<String>) {
        self.push(HistoryEntry {
            expression: expression.into(),
            result: result.into(),
            added_at: Utc::now(),
        });
    }

    /// Record a prebuilt entry, dropping the oldest ones beyond the cap.
    pub fn push(&self, entry: HistoryEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
        trace!("History now holds {} entries", entries.len());
    }

    /// Matches among the newest `scan_limit` entries, newest first.
    #[must_use]
    pub fn search(&self, filter: &str) -> Vec<HistoryEntry> {
        let entries = self.lock();
        entries
            .iter()
            .rev()
            .take(self.scan_limit)
            .filter(|entry| entry.matches(filter))
            .cloned()
            .collect()
    }

    /// Newest entries first, without filtering.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn scan_limit(&self) -> usize {
        self.scan_limit
    }

    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_LIMIT, DEFAULT_MAX_ENTRIES)
    }
}
