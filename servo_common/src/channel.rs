//! Channel addressing and per-channel configuration.
//!
//! A channel is one physical servo output, addressed by
//! `(board index, channel index)`. Its configuration bounds every position
//! the engine is allowed to write to it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{CHANNELS_PER_BOARD, MAX_BOARDS};

/// Address of one servo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    /// Board index in the board table.
    pub board: usize,
    /// Channel index on that board.
    pub channel: usize,
}

impl ChannelId {
    #[inline]
    pub const fn new(board: usize, channel: usize) -> Self {
        Self { board, channel }
    }

    /// True if the address fits the static grid (not necessarily a detected board).
    #[inline]
    pub const fn in_grid(&self) -> bool {
        self.board < MAX_BOARDS && self.channel < CHANNELS_PER_BOARD
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.board, self.channel)
    }
}

/// Per-channel configuration.
///
/// # Invariants
/// - `0 ≤ center ≤ 100`
/// - `0 ≤ range ≤ 50`
/// - effective bounds are `[center − range, center + range]` clamped to `[0, 100]`
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// Is this channel allowed to move?
    pub enabled: bool,
    /// Center position [%].
    pub center: f32,
    /// Allowed deviation around center [%].
    pub range: f32,
    /// Position applied by `system init` [%].
    pub init_position: f32,
    /// Part of an inverse pair.
    pub is_pair: bool,
    /// Linked channel (only meaningful on a pair master).
    pub pair: Option<ChannelId>,
    /// Master side of the pair (propagates its writes).
    pub is_pair_master: bool,
    /// Human-readable name.
    pub name: String,
}

impl ChannelConfig {
    pub const DEFAULT_CENTER: f32 = 50.0;
    pub const DEFAULT_RANGE: f32 = 50.0;
    pub const MAX_RANGE: f32 = 50.0;

    /// Factory defaults for the channel at `id`.
    pub fn default_for(id: ChannelId) -> Self {
        Self {
            enabled: false,
            center: Self::DEFAULT_CENTER,
            range: Self::DEFAULT_RANGE,
            init_position: Self::DEFAULT_CENTER,
            is_pair: false,
            pair: None,
            is_pair_master: false,
            name: format!("Board {} Servo {}", id.board, id.channel),
        }
    }

    /// Effective `(min, max)` position bounds.
    #[inline]
    pub fn bounds(&self) -> (f32, f32) {
        let min = (self.center - self.range).clamp(0.0, 100.0);
        let max = (self.center + self.range).clamp(0.0, 100.0);
        (min, max)
    }

    /// Clamp a requested position into the effective bounds.
    #[inline]
    pub fn clamp(&self, position: f32) -> f32 {
        let (min, max) = self.bounds();
        position.clamp(min, max)
    }

    /// True if this channel propagates its writes to a partner.
    #[inline]
    pub fn propagates(&self) -> bool {
        self.is_pair && self.is_pair_master
    }

    /// Clear any pairing state.
    pub fn unpair(&mut self) {
        self.is_pair = false;
        self.is_pair_master = false;
        self.pair = None;
    }
}

/// Runtime description of one detected board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    /// Bus address.
    pub address: u8,
    /// Found during the last discovery scan.
    pub detected: bool,
    /// Writes are allowed.
    pub enabled: bool,
    /// Display name.
    pub name: String,
}

impl BoardInfo {
    /// Default name given to a board found at `address`.
    pub fn default_name(address: u8) -> String {
        format!("PCA9685 @0x{address:02X}")
    }
}
