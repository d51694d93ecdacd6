//! Sweep Engine.
//!
//! A fixed pool of linear interpolations, at most one per channel. The pool
//! only computes positions; the engine writes them through the mapper.

use servo_common::channel::ChannelId;
use servo_common::consts::MAX_CHANNELS;
use tracing::debug;

use crate::error::CommandError;

/// One pool slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepAction {
    pub target: ChannelId,
    pub start: f32,
    pub end: f32,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub active: bool,
}

impl SweepAction {
    pub const IDLE: Self = Self {
        target: ChannelId::new(0, 0),
        start: 0.0,
        end: 0.0,
        start_ms: 0,
        duration_ms: 0,
        active: false,
    };

    /// Interpolated position at `now`, and whether the sweep is complete.
    #[inline]
    pub fn sample(&self, now_ms: u64) -> (f32, bool) {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        if elapsed >= self.duration_ms {
            return (self.end, true);
        }
        let progress = elapsed as f32 / self.duration_ms as f32;
        (self.start + (self.end - self.start) * progress, false)
    }
}

/// Position produced by one slot during [`SweepPool::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSample {
    pub target: ChannelId,
    pub position: f32,
    /// Exact end position; the slot has been released.
    pub finished: bool,
}

/// Fixed-capacity sweep pool.
pub struct SweepPool {
    slots: [SweepAction; MAX_CHANNELS],
    active: usize,
}

impl Default for SweepPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepPool {
    pub const fn new() -> Self {
        Self {
            slots: [SweepAction::IDLE; MAX_CHANNELS],
            active: 0,
        }
    }

    /// Register a sweep, replacing any active sweep on the same channel.
    ///
    /// Positions are expected to be already clamped by the caller.
    pub fn start(
        &mut self,
        target: ChannelId,
        start: f32,
        end: f32,
        now_ms: u64,
        duration_ms: u64,
    ) -> Result<(), CommandError> {
        if duration_ms == 0 {
            return Err(CommandError::validation("Sweep duration must be positive"));
        }

        let slot = match self.slot_for(target) {
            Some(i) => i,
            None => {
                let free = self
                    .slots
                    .iter()
                    .position(|s| !s.active)
                    .ok_or_else(|| CommandError::exhausted("No free sweep slot"))?;
                self.active += 1;
                free
            }
        };

        self.slots[slot] = SweepAction {
            target,
            start,
            end,
            start_ms: now_ms,
            duration_ms,
            active: true,
        };
        debug!(target_channel = %target, start, end, duration_ms, slot, "Sweep started");
        Ok(())
    }

    fn slot_for(&self, target: ChannelId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.active && s.target == target)
    }

    /// Deactivate the sweep on `target`. Returns false if none was running.
    pub fn stop(&mut self, target: ChannelId) -> bool {
        match self.slot_for(target) {
            Some(i) => {
                self.slots[i].active = false;
                self.active -= 1;
                true
            }
            None => false,
        }
    }

    /// Deactivate every sweep. Returns how many were running.
    pub fn stop_all(&mut self) -> usize {
        let stopped = self.active;
        for slot in self.slots.iter_mut() {
            slot.active = false;
        }
        self.active = 0;
        stopped
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn is_active(&self, target: ChannelId) -> bool {
        self.slot_for(target).is_some()
    }

    pub fn active(&self) -> impl Iterator<Item = &SweepAction> {
        self.slots.iter().filter(|s| s.active)
    }

    /// Sample every active sweep at `now`. Finished slots are released and
    /// report their exact end position.
    pub fn advance(&mut self, now_ms: u64) -> heapless::Vec<SweepSample, MAX_CHANNELS> {
        let mut samples = heapless::Vec::new();
        if self.active == 0 {
            return samples;
        }

        for slot in self.slots.iter_mut().filter(|s| s.active) {
            let (position, finished) = slot.sample(now_ms);
            if finished {
                slot.active = false;
                self.active -= 1;
            }
            // At most one sample per slot, so this never overflows.
            let _ = samples.push(SweepSample {
                target: slot.target,
                position,
                finished,
            });
        }
        samples
    }
}
