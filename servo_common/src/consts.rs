//! System-wide constants.
//!
//! Capacities here size every fixed arena in the engine: the board table,
//! the channel grid and the sweep slot pool.

/// Maximum number of PWM boards on the bus.
pub const MAX_BOARDS: usize = 8;

/// Output channels per PWM board.
pub const CHANNELS_PER_BOARD: usize = 16;

/// Total addressable channels (board table × channels per board).
pub const MAX_CHANNELS: usize = MAX_BOARDS * CHANNELS_PER_BOARD;

/// I2C addresses probed during a discovery scan, in probe order.
pub const PROBE_ADDRESSES: [u8; 8] = [0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47];

/// Pulse width written for 0% [µs].
pub const PULSE_MIN_US: u16 = 1000;

/// Pulse width written for 100% [µs].
pub const PULSE_MAX_US: u16 = 2000;

/// Analog servos run at ~50 Hz updates.
pub const DEFAULT_PWM_FREQUENCY_HZ: u16 = 50;

/// Maximum stored length of a channel, board or script name.
pub const MAX_NAME_LEN: usize = 31;
