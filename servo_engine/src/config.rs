//! Application configuration (`servo.toml`).
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "servo-engine"
//!
//! [hardware]
//! driver = "simulation"
//! pwm_frequency_hz = 50
//! simulated_addresses = [64, 65]
//!
//! [engine]
//! tick_interval_ms = 5
//!
//! [store]
//! dir = "data"
//! ```

use serde::{Deserialize, Serialize};
use servo_common::config::{ConfigError, LogLevel, ServiceConfig};
use servo_common::consts::{DEFAULT_PWM_FREQUENCY_HZ, PROBE_ADDRESSES};
use servo_common::driver::BusSettings;
use std::path::PathBuf;

fn default_driver() -> String {
    "simulation".to_string()
}

fn default_pwm_frequency_hz() -> u16 {
    DEFAULT_PWM_FREQUENCY_HZ
}

fn default_simulated_addresses() -> Vec<u8> {
    vec![PROBE_ADDRESSES[0]]
}

fn default_tick_interval_ms() -> u64 {
    5
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Bus and board settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Key into the bus registry.
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default = "default_pwm_frequency_hz")]
    pub pwm_frequency_hz: u16,
    /// Boards answering on the simulation bus.
    #[serde(default = "default_simulated_addresses")]
    pub simulated_addresses: Vec<u8>,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            pwm_frequency_hz: default_pwm_frequency_hz(),
            simulated_addresses: default_simulated_addresses(),
        }
    }
}

impl HardwareConfig {
    pub fn bus_settings(&self) -> BusSettings {
        BusSettings {
            simulated_addresses: self.simulated_addresses.clone(),
        }
    }
}

/// Host loop pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Sleep between ticks [ms].
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Where the configuration slots live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

/// Full `servo.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub shared: ServiceConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub engine: LoopConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shared: ServiceConfig {
                log_level: LogLevel::Info,
                service_name: "servo-engine".to_string(),
            },
            hardware: HardwareConfig::default(),
            engine: LoopConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate ranges after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.hardware.driver.is_empty() {
            return Err(ConfigError::Invalid(
                "hardware.driver cannot be empty".to_string(),
            ));
        }
        if !(24..=1526).contains(&self.hardware.pwm_frequency_hz) {
            return Err(ConfigError::Invalid(format!(
                "hardware.pwm_frequency_hz must be 24-1526, got {}",
                self.hardware.pwm_frequency_hz
            )));
        }
        if let Some(bad) = self
            .hardware
            .simulated_addresses
            .iter()
            .find(|a| !PROBE_ADDRESSES.contains(*a))
        {
            return Err(ConfigError::Invalid(format!(
                "hardware.simulated_addresses: 0x{bad:02X} is not a probed address (0x40-0x47)"
            )));
        }
        if !(1..=100).contains(&self.engine.tick_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "engine.tick_interval_ms must be 1-100, got {}",
                self.engine.tick_interval_ms
            )));
        }
        Ok(())
    }
}
