use std::collections::VecDeque;

pub const WELCOME_MESSAGE: &str =
    "Welcome to Wumpus World (Simulated)! Please start the replay to begin.";

/// Bounded, newest-first log of human-readable replay messages.
///
/// Once `capacity` is reached the oldest entry is dropped for every push.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let mut log = Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        };
        log.reset();
        log
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "wumpus_replay::messages", "{}", message);
        self.entries.push_front(message);
        self.entries.truncate(self.capacity);
    }

    /// Back to just the welcome line
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push_front(WELCOME_MESSAGE.to_string());
    }

    /// Keep only error lines and the welcome line
    pub fn retain_errors(&mut self) {
        self.entries
            .retain(|m| m.contains("ERROR") || m == WELCOME_MESSAGE);
    }

    /// Entries, newest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
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
