//! Servo Common Library
//!
//! Shared constants, identity types and configuration loading for all
//! crates of the servo workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Board/channel limits, pulse widths, probe addresses
//! - [`channel`] - Channel addressing and per-channel configuration
//! - [`driver`] - PWM bus / board driver trait seam
//! - [`record`] - Persisted configuration record shapes
//! - [`config`] - TOML configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use servo_common::prelude::*;
//!
//! let id = ChannelId::new(0, 3);
//! assert_eq!(id.to_string(), "0:3");
//! ```

pub mod channel;
pub mod config;
pub mod consts;
pub mod driver;
pub mod prelude;
pub mod record;
