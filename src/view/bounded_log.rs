use std::collections::VecDeque;

/// Maximum number of entries kept per event log
pub const LOG_CAPACITY: usize = 5;

/// Newest-first event list that evicts its oldest entry on overflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundedEventLog {
    entries: VecDeque<String>,
}

impl BoundedEventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY + 1),
        }
    }

    /// Prepend an entry, dropping from the tail so at most `LOG_CAPACITY` remain
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push_front(entry.into());
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
