//! # Servo HAL Library
//!
//! Bus drivers for PWM servo boards, selected by name at startup.
//!
//! Drivers implement the `PwmBus` / `PwmBoard` traits defined in
//! `servo_common::driver`.
//!
//! # Module Structure
//!
//! - [`bus_registry`] - Driver name to bus lookup
//! - [`drivers`] - Bus driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     servo_hal                             │
//! │  ┌──────────────┐    ┌──────────────────────────────────┐ │
//! │  │ BusRegistry  │───►│ PwmBus (trait object)            │ │
//! │  │ name→factory │    │   discover() → Vec<PwmBoard>     │ │
//! │  └──────────────┘    └──────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod bus_registry;
pub mod drivers;

pub use crate::bus_registry::BusRegistry;
pub use crate::drivers::simulation::{SimulationBus, SimulationMonitor};
