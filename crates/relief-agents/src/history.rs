//! Bounded conversation history.

use std::collections::VecDeque;

/// A FIFO of the most recent history entries.
///
/// Pushing past the limit drops the oldest entry, so memory per agent is
/// constant regardless of run length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl BoundedHistory {
    /// Create an empty history holding at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Append an entry, evicting the oldest when full.
    pub fn push(&mut self, entry: impl Into<String>) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Owned copy of the entries, oldest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub const fn limit(&self) -> usize {
        self.limit
    }
}
