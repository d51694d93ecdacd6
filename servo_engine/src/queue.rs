//! Timed Queue.
//!
//! Commands with an absolute due time, drained strictly in submission
//! order. A later-due entry at the front holds back everything behind it,
//! even entries that are already due.

use heapless::Deque;
use tracing::debug;

use crate::error::CommandError;

/// Maximum pending queue entries.
pub const MAX_QUEUED_COMMANDS: usize = 100;

/// One pending command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCommand {
    pub command: String,
    pub due_ms: u64,
}

/// Bounded FIFO of delayed commands.
#[derive(Debug)]
pub struct TimedQueue {
    entries: Deque<QueuedCommand, MAX_QUEUED_COMMANDS>,
}

impl Default for TimedQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimedQueue {
    pub fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Append `command` to run at `now + delay`.
    pub fn push(
        &mut self,
        command: impl Into<String>,
        now_ms: u64,
        delay_ms: u64,
    ) -> Result<u64, CommandError> {
        let due_ms = now_ms.saturating_add(delay_ms);
        self.entries
            .push_back(QueuedCommand {
                command: command.into(),
                due_ms,
            })
            .map_err(|rejected| {
                CommandError::exhausted(format!(
                    "Command queue full ({MAX_QUEUED_COMMANDS}), dropped '{}'",
                    rejected.command
                ))
            })?;
        debug!(due_ms, pending = self.entries.len(), "Command queued");
        Ok(due_ms)
    }

    /// Pop the front entry if it is due. Never looks past the front.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<QueuedCommand> {
        match self.entries.front() {
            Some(front) if now_ms >= front.due_ms => self.entries.pop_front(),
            _ => None,
        }
    }

    /// Drop every pending entry. Returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedCommand> {
        self.entries.iter()
    }
}
