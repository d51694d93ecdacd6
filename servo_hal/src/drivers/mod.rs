//! Bus driver implementations.
//!
//! - [`simulation`] - Software bus for development and testing
//!
//! A new driver implements `PwmBus` and `PwmBoard` from
//! `servo_common::driver` and adds its factory to [`BUILTIN_BUSES`].

use servo_common::driver::BusFactory;

pub mod simulation;

/// Drivers every [`BusRegistry`](crate::BusRegistry) starts with.
pub const BUILTIN_BUSES: &[(&str, BusFactory)] = &[("simulation", simulation::create_bus)];
