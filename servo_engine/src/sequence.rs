//! Sequence Runner.
//!
//! A single active ordered list of command steps. The runner owns only
//! ordering and timing: [`SequenceRunner::poll`] hands the engine the next
//! due step, the engine executes it and reports the derived wait back with
//! [`SequenceRunner::finish_step`].

use tracing::{debug, info, warn};

/// Maximum steps held by the active sequence, appended steps included.
pub const MAX_SEQUENCE_STEPS: usize = 100;

/// One sequence entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStep {
    pub command: String,
    /// Script expansion depth that produced this step (0 for plain commands).
    pub depth: usize,
}

impl SequenceStep {
    pub fn new(command: impl Into<String>, depth: usize) -> Self {
        Self {
            command: command.into(),
            depth,
        }
    }
}

/// Result of one [`SequenceRunner::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencePoll {
    /// No sequence running.
    Idle,
    /// Still waiting out the previous step.
    Waiting,
    /// Last step done and its wait elapsed; the runner is now idle.
    Completed { steps: usize },
    /// Blank step skipped with zero wait.
    Skipped,
    /// This step is due now.
    Ready(SequenceStep),
}

/// Single-active sequence state machine over `{idle, running}`.
#[derive(Debug, Default)]
pub struct SequenceRunner {
    steps: heapless::Vec<SequenceStep, MAX_SEQUENCE_STEPS>,
    current: usize,
    wait_until: u64,
    active: bool,
}

impl SequenceRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is running with `steps`, starting at `now`.
    ///
    /// Steps beyond capacity are dropped. Returns the number kept.
    pub fn start<I>(&mut self, steps: I, now_ms: u64) -> usize
    where
        I: IntoIterator<Item = SequenceStep>,
    {
        if self.active {
            debug!(
                replaced_at = self.current,
                of = self.steps.len(),
                "Replacing running sequence"
            );
        }
        self.steps.clear();
        self.current = 0;
        self.wait_until = now_ms;
        let kept = self.extend(steps);
        self.active = true;
        info!(steps = kept, "Command sequence started");
        kept
    }

    /// Append `steps` to the tail of the running sequence.
    ///
    /// Returns the number appended; anything beyond capacity is dropped.
    pub fn append<I>(&mut self, steps: I) -> usize
    where
        I: IntoIterator<Item = SequenceStep>,
    {
        let appended = self.extend(steps);
        debug!(appended, total = self.steps.len(), "Steps appended to sequence");
        appended
    }

    fn extend<I>(&mut self, steps: I) -> usize
    where
        I: IntoIterator<Item = SequenceStep>,
    {
        let mut added = 0;
        for step in steps {
            if self.steps.push(step).is_err() {
                warn!(capacity = MAX_SEQUENCE_STEPS, "Sequence full, remaining steps dropped");
                break;
            }
            added += 1;
        }
        added
    }

    /// Advance the state machine by one tick.
    pub fn poll(&mut self, now_ms: u64) -> SequencePoll {
        if !self.active {
            return SequencePoll::Idle;
        }
        if now_ms < self.wait_until {
            return SequencePoll::Waiting;
        }
        if self.current >= self.steps.len() {
            self.active = false;
            info!(steps = self.steps.len(), "Command sequence completed");
            return SequencePoll::Completed {
                steps: self.steps.len(),
            };
        }

        let step = &self.steps[self.current];
        if step.command.trim().is_empty() {
            self.current += 1;
            self.wait_until = now_ms;
            return SequencePoll::Skipped;
        }
        SequencePoll::Ready(step.clone())
    }

    /// Mark the step handed out by [`poll`](Self::poll) as done and wait
    /// `wait_ms` before the next one. No-op if the step stopped the sequence.
    pub fn finish_step(&mut self, now_ms: u64, wait_ms: u64) {
        if !self.active {
            return;
        }
        self.current += 1;
        self.wait_until = now_ms.saturating_add(wait_ms);
    }

    /// Abort the running sequence. Returns false if none was running.
    pub fn stop(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.steps.clear();
        self.current = 0;
        was_active
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[inline]
    pub fn wait_until(&self) -> u64 {
        self.wait_until
    }

    /// Free step slots left for appends.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        MAX_SEQUENCE_STEPS - self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(cmds: &[&str]) -> Vec<SequenceStep> {
        cmds.iter().map(|c| SequenceStep::new(*c, 0)).collect()
    }

    #[test]
    fn runs_steps_in_order_with_waits() {
        let mut seq = SequenceRunner::new();
        seq.start(steps(&["a", "b"]), 0);

        assert_eq!(seq.poll(0), SequencePoll::Ready(SequenceStep::new("a", 0)));
        seq.finish_step(0, 100);
        assert_eq!(seq.poll(99), SequencePoll::Waiting);
        assert_eq!(seq.poll(100), SequencePoll::Ready(SequenceStep::new("b", 0)));
        seq.finish_step(100, 0);
        assert_eq!(seq.poll(100), SequencePoll::Completed { steps: 2 });
        assert!(!seq.is_active());
        assert_eq!(seq.poll(200), SequencePoll::Idle);
    }

    #[test]
    fn blank_steps_are_skipped() {
        let mut seq = SequenceRunner::new();
        seq.start(steps(&["  ", "x"]), 5);
        assert_eq!(seq.poll(5), SequencePoll::Skipped);
        assert_eq!(seq.current_index(), 1);
        assert!(matches!(seq.poll(5), SequencePoll::Ready(_)));
    }

    #[test]
    fn start_replaces_and_append_extends() {
        let mut seq = SequenceRunner::new();
        seq.start(steps(&["a", "b", "c"]), 0);
        seq.poll(0);
        seq.finish_step(0, 0);

        seq.start(steps(&["x"]), 10);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.current_index(), 0);

        assert_eq!(seq.append(steps(&["y", "z"])), 2);
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn capacity_truncates() {
        let mut seq = SequenceRunner::new();
        let many: Vec<SequenceStep> = (0..150).map(|i| SequenceStep::new(format!("s{i}"), 0)).collect();
        assert_eq!(seq.start(many, 0), MAX_SEQUENCE_STEPS);
        assert_eq!(seq.remaining_capacity(), 0);
        assert_eq!(seq.append(steps(&["late"])), 0);
    }

    #[test]
    fn finish_after_stop_is_ignored() {
        let mut seq = SequenceRunner::new();
        seq.start(steps(&["stop sequence", "never"]), 0);
        assert!(matches!(seq.poll(0), SequencePoll::Ready(_)));
        assert!(seq.stop());
        seq.finish_step(0, 0);
        assert_eq!(seq.poll(0), SequencePoll::Idle);
        assert_eq!(seq.current_index(), 0);
    }
}
