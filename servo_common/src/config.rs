//! TOML configuration for servo services.
//!
//! Every binary in the workspace reads one TOML file at startup. The
//! `[shared]` table ([`ServiceConfig`]) names the service and sets its log
//! level; the rest of the file belongs to the binary. Any deserializable
//! struct picks up [`TomlConfig`] and can be read straight from disk:
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use servo_common::config::{ConfigError, ServiceConfig, TomlConfig};
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct RigConfig {
//!     shared: ServiceConfig,
//!     boards: Vec<u8>,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let rig = RigConfig::from_toml_file(Path::new("rig.toml"))?;
//!     println!("{} drives {} board(s)", rig.shared.service_name, rig.boards.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consts::MAX_NAME_LEN;

/// Why a config file could not be turned into a usable struct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Nothing at the path. Binaries fall back to defaults on this one.
    #[error("No configuration file at {}", .0.display())]
    Missing(PathBuf),

    /// The file exists but could not be read.
    #[error("Cannot read {}: {reason}", .path.display())]
    Unreadable {
        /// File that failed.
        path: PathBuf,
        /// OS error text.
        reason: String,
    },

    /// Not valid TOML, or a key has the wrong shape.
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    /// Well-formed but out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// `log_level` values accepted in `[shared]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every sweep sample and queue poll.
    Trace,
    /// Script expansion and driver traffic.
    Debug,
    /// Commands, sequence progress, board discovery.
    #[default]
    Info,
    /// Rejected commands and skipped boards.
    Warn,
    /// Driver failures only.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// The `[shared]` table.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "servo-engine"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Shown in the startup banner.
    pub service_name: String,
}

impl ServiceConfig {
    /// Service names are non-blank and fit a board/servo name slot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.service_name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("service_name is blank".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ConfigError::Invalid(format!(
                "service_name longer than {MAX_NAME_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Read a struct from a TOML file or string.
pub trait TomlConfig: Sized + serde::de::DeserializeOwned {
    /// A missing file is [`ConfigError::Missing`] so callers can tell it
    /// apart from a broken one.
    fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::Missing(path.to_path_buf()),
            _ => ConfigError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        Self::from_toml_str(&text)
    }

    fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> TomlConfig for T {}
