//! Shared rig for the integration tests.

mod clamping;
mod pairing;
mod persistence;
mod queue_order;
mod scripts;
mod sequences;
mod sweeps;

use servo_engine::clock::ManualClock;
use servo_engine::store::{ConfigStore, MemoryStore};
use servo_engine::{EngineSettings, ServoEngine};
use servo_hal::{SimulationBus, SimulationMonitor};

/// Engine plus the handles a test needs to observe it.
pub struct Rig {
    pub engine: ServoEngine,
    pub clock: ManualClock,
    pub monitor: SimulationMonitor,
}

impl Rig {
    pub fn new(addresses: &[u8]) -> Self {
        Self::with_store(addresses, Box::new(MemoryStore::new()))
    }

    pub fn with_store(addresses: &[u8], store: Box<dyn ConfigStore>) -> Self {
        let bus = SimulationBus::new(addresses.to_vec());
        let monitor = bus.monitor();
        let clock = ManualClock::new(0);
        let mut engine = ServoEngine::new(
            Box::new(bus),
            store,
            Box::new(clock.clone()),
            EngineSettings::default(),
        );
        engine.startup();
        Self {
            engine,
            clock,
            monitor,
        }
    }

    /// Run a command and require success.
    pub fn ok(&mut self, line: &str) -> String {
        let reply = self.engine.execute_command(line);
        assert!(reply.starts_with("Success"), "{line} -> {reply}");
        reply
    }

    pub fn enable(&mut self, board: usize, channel: usize) {
        self.ok(&format!("config {board} {channel} enabled true"));
    }

    /// Set the clock and tick once.
    pub fn tick_at(&mut self, ms: u64) {
        self.clock.set(ms);
        self.engine.tick();
    }

    /// Tick `n` times without moving the clock.
    pub fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.engine.tick();
        }
    }
}
