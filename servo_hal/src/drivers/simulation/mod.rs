//! Simulation bus module.
//!
//! Emulates a bus of PWM boards without hardware. Every pulse written is
//! recorded and can be inspected through a [`SimulationMonitor`].

mod bus;

pub use bus::{SimulatedBoard, SimulationBus, SimulationMonitor};

use servo_common::driver::{BusSettings, PwmBus};

/// Factory function to create a simulation bus instance.
pub fn create_bus(settings: &BusSettings) -> Box<dyn PwmBus> {
    Box::new(SimulationBus::new(settings.simulated_addresses.clone()))
}
