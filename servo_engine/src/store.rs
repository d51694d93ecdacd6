//! Configuration store.
//!
//! Two independent slots hold a [`ConfigRecord`]: the live configuration
//! and an offline backup. [`JsonFileStore`] keeps them as pretty-printed
//! JSON files in one directory; [`MemoryStore`] keeps them in memory.

use parking_lot::Mutex;
use servo_common::record::ConfigRecord;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// File system failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Named store slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSlot {
    /// Configuration applied on startup.
    Live,
    /// Backup copy.
    Offline,
}

impl ConfigSlot {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Live => "servo_config.json",
            Self::Offline => "offline_config.json",
        }
    }
}

impl fmt::Display for ConfigSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

/// Persistent storage for servo and script configuration.
pub trait ConfigStore: Send {
    /// Read a slot. `Ok(None)` if the slot has never been written.
    fn load(&self, slot: ConfigSlot) -> Result<Option<ConfigRecord>, StoreError>;

    /// Overwrite a slot.
    fn save(&mut self, slot: ConfigSlot, record: &ConfigRecord) -> Result<(), StoreError>;
}

/// JSON files in one directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, slot: ConfigSlot) -> PathBuf {
        self.dir.join(slot.file_name())
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self, slot: ConfigSlot) -> Result<Option<ConfigRecord>, StoreError> {
        let path = self.path(slot);
        debug!("Loading {slot} configuration from {:?}", path);

        if !path.exists() {
            info!("No {slot} configuration at {:?}, keeping defaults", path);
            return Ok(None);
        }

        let file = File::open(&path)
            .map_err(|e| StoreError::Io(format!("Failed to open {}: {e}", path.display())))?;
        let record: ConfigRecord =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                warn!("Failed to parse {:?}: {}", path, e);
                StoreError::Serialization(format!("Failed to parse {}: {e}", path.display()))
            })?;

        info!(
            "Loaded {slot} configuration: {} board(s), {} script(s)",
            record.boards.len(),
            record.scripts.as_ref().map_or(0, Vec::len)
        );
        Ok(Some(record))
    }

    fn save(&mut self, slot: ConfigSlot, record: &ConfigRecord) -> Result<(), StoreError> {
        let path = self.path(slot);
        debug!("Saving {slot} configuration to {:?}", path);

        fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::Io(format!("Failed to create {}: {e}", self.dir.display()))
        })?;
        let file = File::create(&path)
            .map_err(|e| StoreError::Io(format!("Failed to create {}: {e}", path.display())))?;
        serde_json::to_writer_pretty(BufWriter::new(file), record)
            .map_err(|e| StoreError::Serialization(format!("Failed to write config: {e}")))?;

        info!("Saved {slot} configuration to {:?}", path);
        Ok(())
    }
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<[Option<ConfigRecord>; 2]>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(slot: ConfigSlot) -> usize {
        match slot {
            ConfigSlot::Live => 0,
            ConfigSlot::Offline => 1,
        }
    }

    /// Seed a slot directly.
    pub fn put(&self, slot: ConfigSlot, record: ConfigRecord) {
        self.slots.lock()[Self::index(slot)] = Some(record);
    }

    /// Current content of a slot.
    pub fn get(&self, slot: ConfigSlot) -> Option<ConfigRecord> {
        self.slots.lock()[Self::index(slot)].clone()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self, slot: ConfigSlot) -> Result<Option<ConfigRecord>, StoreError> {
        Ok(self.get(slot))
    }

    fn save(&mut self, slot: ConfigSlot, record: &ConfigRecord) -> Result<(), StoreError> {
        self.put(slot, record.clone());
        Ok(())
    }
}
