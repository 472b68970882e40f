//! # Run History
//!
//! Summaries of the most recent suite runs, most recent first.

use std::collections::VecDeque;

use serde::Serialize;

use crate::testing::RunReport;

/// Maximum number of history entries to retain.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// A single history entry recording a past run and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub started_at: u64,
    pub base_url: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub duration_ms: u128,
}

impl From<&RunReport> for HistoryEntry {
    fn from(report: &RunReport) -> Self {
        Self {
            started_at: report.started_at,
            base_url: report.base_url.clone(),
            total: report.total,
            passed: report.passed,
            failed: report.failed,
            aborted: report.aborted,
            duration_ms: report.duration_ms,
        }
    }
}

impl HistoryEntry {
    pub fn is_success(&self) -> bool {
        self.passed == self.total
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{:<12} {:<6} {}/{} passed, {} failed, {} aborted, {} ms  {}",
            self.started_at,
            if self.is_success() { "PASS" } else { "FAIL" },
            self.passed,
            self.total,
            self.failed,
            self.aborted,
            self.duration_ms,
            self.base_url
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Add an entry to the front, evicting the oldest entry when full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= MAX_HISTORY_ENTRIES {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    pub fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
