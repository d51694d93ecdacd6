//! Bus selection by driver name.
//!
//! `hardware.driver` in the engine config names a bus; [`BusRegistry`] turns
//! that name into an open [`PwmBus`]. The binary builds one table at startup
//! and drops it once the bus is open.

use servo_common::driver::{BusFactory, BusSettings, DriverError, PwmBus};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

use crate::drivers::BUILTIN_BUSES;

/// Driver name to bus factory table.
pub struct BusRegistry {
    factories: HashMap<&'static str, BusFactory>,
}

impl BusRegistry {
    /// Table holding every bus driver compiled into this crate.
    pub fn with_builtin() -> Self {
        let factories = BUILTIN_BUSES.iter().copied().collect();
        Self { factories }
    }

    /// Add an out-of-tree bus driver. Names are unique.
    pub fn register(&mut self, name: &'static str, factory: BusFactory) -> Result<(), DriverError> {
        match self.factories.entry(name) {
            Entry::Occupied(_) => Err(DriverError::DuplicateDriver(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(factory);
                debug!(driver = name, "Bus driver registered");
                Ok(())
            }
        }
    }

    /// Open the bus registered under `name`.
    pub fn create_bus(
        &self,
        name: &str,
        settings: &BusSettings,
    ) -> Result<Box<dyn PwmBus>, DriverError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DriverError::DriverNotFound(name.to_string()))?;
        debug!(driver = name, "Opening bus");
        Ok(factory(settings))
    }
}
