//! Simulated PWM bus and boards.
//!
//! The `SimulationBus` implements `PwmBus` over a fixed set of "present"
//! addresses. All boards share one recorder so that a [`SimulationMonitor`]
//! handed out before the bus is moved into the engine can still observe
//! every write.

use parking_lot::Mutex;
use servo_common::consts::CHANNELS_PER_BOARD;
use servo_common::driver::{DriverError, PwmBoard, PwmBus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Recorded state of one simulated board.
#[derive(Debug, Clone, Default)]
struct BoardState {
    frequency_hz: Option<u16>,
    pulses: [Option<u16>; CHANNELS_PER_BOARD],
    writes: u64,
    fail_writes: bool,
}

#[derive(Debug, Default)]
struct Recorder {
    boards: HashMap<u8, BoardState>,
    scans: u32,
}

/// Simulation bus implementing the `PwmBus` trait.
pub struct SimulationBus {
    present: Vec<u8>,
    recorder: Arc<Mutex<Recorder>>,
}

impl SimulationBus {
    /// Create a bus on which boards answer at `present` addresses.
    pub fn new(present: Vec<u8>) -> Self {
        Self {
            present,
            recorder: Arc::new(Mutex::new(Recorder::default())),
        }
    }

    /// Handle for inspecting writes after the bus has been moved away.
    pub fn monitor(&self) -> SimulationMonitor {
        SimulationMonitor {
            recorder: Arc::clone(&self.recorder),
        }
    }
}

impl PwmBus for SimulationBus {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn discover(&mut self, candidates: &[u8]) -> Result<Vec<Box<dyn PwmBoard>>, DriverError> {
        let mut recorder = self.recorder.lock();
        recorder.scans += 1;

        let mut found: Vec<Box<dyn PwmBoard>> = Vec::new();
        for &address in candidates {
            if !self.present.contains(&address) {
                trace!("No simulated board at 0x{address:02X}");
                continue;
            }
            recorder.boards.entry(address).or_default();
            found.push(Box::new(SimulatedBoard {
                address,
                recorder: Arc::clone(&self.recorder),
            }));
        }

        info!(
            "Simulation bus scan #{}: {} board(s) present",
            recorder.scans,
            found.len()
        );
        Ok(found)
    }
}

/// One simulated board handle.
pub struct SimulatedBoard {
    address: u8,
    recorder: Arc<Mutex<Recorder>>,
}

impl PwmBoard for SimulatedBoard {
    fn address(&self) -> u8 {
        self.address
    }

    fn initialize(&mut self, frequency_hz: u16) -> Result<(), DriverError> {
        let mut recorder = self.recorder.lock();
        let board = recorder.boards.entry(self.address).or_default();
        board.frequency_hz = Some(frequency_hz);
        debug!("Simulated board 0x{:02X} set to {} Hz", self.address, frequency_hz);
        Ok(())
    }

    fn write_pulse_us(&mut self, channel: u8, pulse_us: u16) -> Result<(), DriverError> {
        if channel as usize >= CHANNELS_PER_BOARD {
            return Err(DriverError::InvalidChannel {
                address: self.address,
                channel,
            });
        }
        let mut recorder = self.recorder.lock();
        let board = recorder.boards.entry(self.address).or_default();
        if board.fail_writes {
            return Err(DriverError::CommunicationError(format!(
                "no ack from 0x{:02X}",
                self.address
            )));
        }
        board.pulses[channel as usize] = Some(pulse_us);
        board.writes += 1;
        Ok(())
    }
}

/// Read-side handle onto the simulation recorder.
#[derive(Clone)]
pub struct SimulationMonitor {
    recorder: Arc<Mutex<Recorder>>,
}

impl SimulationMonitor {
    /// Last pulse width written to `(address, channel)`.
    pub fn pulse_us(&self, address: u8, channel: u8) -> Option<u16> {
        self.recorder
            .lock()
            .boards
            .get(&address)
            .and_then(|b| b.pulses.get(channel as usize).copied().flatten())
    }

    /// Number of successful writes to the board at `address`.
    pub fn write_count(&self, address: u8) -> u64 {
        self.recorder
            .lock()
            .boards
            .get(&address)
            .map_or(0, |b| b.writes)
    }

    /// PWM frequency the board at `address` was initialized with.
    pub fn frequency_hz(&self, address: u8) -> Option<u16> {
        self.recorder
            .lock()
            .boards
            .get(&address)
            .and_then(|b| b.frequency_hz)
    }

    /// Number of discovery scans performed.
    pub fn scan_count(&self) -> u32 {
        self.recorder.lock().scans
    }

    /// Make every write to `address` fail with a communication error.
    pub fn set_fail_writes(&self, address: u8, fail: bool) {
        self.recorder
            .lock()
            .boards
            .entry(address)
            .or_default()
            .fail_writes = fail;
    }
}
