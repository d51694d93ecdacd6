//! Prelude module for common re-exports.
//!
//! ```rust
//! use servo_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ServiceConfig, TomlConfig};

// ─── Channels & Boards ──────────────────────────────────────────────
pub use crate::channel::{BoardInfo, ChannelConfig, ChannelId};
pub use crate::consts::{CHANNELS_PER_BOARD, MAX_BOARDS, MAX_CHANNELS};

// ─── Drivers ────────────────────────────────────────────────────────
pub use crate::driver::{BusFactory, BusSettings, DriverError, PwmBoard, PwmBus};

// ─── Persistence ────────────────────────────────────────────────────
pub use crate::record::{BoardRecord, ChannelRecord, ConfigRecord, ScriptRecord};
