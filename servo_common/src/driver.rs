//! PWM bus driver traits and error types.
//!
//! This module defines:
//! - `PwmBus` trait - Board discovery on one physical bus
//! - `PwmBoard` trait - One exclusively owned board handle
//! - `DriverError` enum - Error types for driver operations
//! - `BusFactory` type alias - Factory function type

use thiserror::Error;

/// Error types for driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Board or bus initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Bus communication error
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Bus driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// A second bus driver was offered under a name already taken
    #[error("Driver '{0}' is already registered")]
    DuplicateDriver(String),

    /// Channel index outside the board
    #[error("Invalid channel {channel} on board @0x{address:02X}")]
    InvalidChannel {
        /// Board address.
        address: u8,
        /// Offending channel.
        channel: u8,
    },
}

/// Settings handed to a bus factory.
#[derive(Debug, Clone, Default)]
pub struct BusSettings {
    /// Addresses the simulation bus reports as present (ignored by real buses).
    pub simulated_addresses: Vec<u8>,
}

/// Factory function type for creating bus instances.
pub type BusFactory = fn(&BusSettings) -> Box<dyn PwmBus>;

/// Trait defining one physical bus carrying PWM boards.
///
/// # Lifecycle
///
/// 1. `discover()` - Called on every scan; previous handles are dropped first
/// 2. `PwmBoard::initialize()` - Called once per discovered board
/// 3. `PwmBoard::write_pulse_us()` - Called from the engine tick
pub trait PwmBus: Send {
    /// Returns the driver's unique identifier (e.g., "simulation", "pca9685").
    fn name(&self) -> &'static str;

    /// Probe the candidate addresses and open a handle for every board found.
    ///
    /// Boards are returned in probe order.
    fn discover(&mut self, candidates: &[u8]) -> Result<Vec<Box<dyn PwmBoard>>, DriverError>;
}

/// One board handle, exclusively owned by the board table entry.
///
/// # Timing
/// `write_pulse_us()` is called from the tick and must not block.
pub trait PwmBoard: Send {
    /// Bus address of this board.
    fn address(&self) -> u8;

    /// Configure the PWM output frequency.
    fn initialize(&mut self, frequency_hz: u16) -> Result<(), DriverError>;

    /// Write a pulse width to one channel.
    fn write_pulse_us(&mut self, channel: u8, pulse_us: u16) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullBoard {
        address: u8,
        frequency: Option<u16>,
    }

    impl PwmBoard for NullBoard {
        fn address(&self) -> u8 {
            self.address
        }

        fn initialize(&mut self, frequency_hz: u16) -> Result<(), DriverError> {
            self.frequency = Some(frequency_hz);
            Ok(())
        }

        fn write_pulse_us(&mut self, channel: u8, _pulse_us: u16) -> Result<(), DriverError> {
            if channel >= 16 {
                return Err(DriverError::InvalidChannel {
                    address: self.address,
                    channel,
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::InitFailed("no ack".to_string());
        assert!(err.to_string().contains("no ack"));

        let err = DriverError::InvalidChannel {
            address: 0x40,
            channel: 17,
        };
        assert_eq!(err.to_string(), "Invalid channel 17 on board @0x40");
    }

    #[test]
    fn test_board_trait_object() {
        let mut board: Box<dyn PwmBoard> = Box::new(NullBoard {
            address: 0x42,
            frequency: None,
        });
        assert_eq!(board.address(), 0x42);
        assert!(board.initialize(50).is_ok());
        assert!(board.write_pulse_us(3, 1500).is_ok());
        assert!(board.write_pulse_us(16, 1500).is_err());
    }
}
