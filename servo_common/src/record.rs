//! Persisted configuration record shapes.
//!
//! Logical shape of the stored configuration: a board list with per-board
//! channel lists, and a script list. Keys are camelCase; `pairBoard` and
//! `pairServo` use `-1` for "no partner".

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelConfig, ChannelId};

/// Whole stored configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    #[serde(default)]
    pub boards: Vec<BoardRecord>,
    /// `None` when the record predates script storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vec<ScriptRecord>>,
}

/// One board and all its channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub address: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub servos: Vec<ChannelRecord>,
}

/// One channel's stored configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_center")]
    pub center: f32,
    #[serde(default = "default_center")]
    pub range: f32,
    #[serde(default = "default_center")]
    pub init_position: f32,
    #[serde(default)]
    pub is_pair: bool,
    #[serde(default = "default_none_index")]
    pub pair_board: i32,
    #[serde(default = "default_none_index")]
    pub pair_servo: i32,
    #[serde(default)]
    pub is_pair_master: bool,
    #[serde(default)]
    pub name: String,
}

/// One stored script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub commands: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_center() -> f32 {
    ChannelConfig::DEFAULT_CENTER
}

fn default_none_index() -> i32 {
    -1
}

impl From<&ChannelConfig> for ChannelRecord {
    fn from(cfg: &ChannelConfig) -> Self {
        let (pair_board, pair_servo) = match cfg.pair {
            Some(id) => (id.board as i32, id.channel as i32),
            None => (-1, -1),
        };
        Self {
            enabled: cfg.enabled,
            center: cfg.center,
            range: cfg.range,
            init_position: cfg.init_position,
            is_pair: cfg.is_pair,
            pair_board,
            pair_servo,
            is_pair_master: cfg.is_pair_master,
            name: cfg.name.clone(),
        }
    }
}

impl ChannelRecord {
    /// Apply this record onto a live config. An empty name keeps the current one.
    pub fn apply_to(&self, cfg: &mut ChannelConfig) {
        cfg.enabled = self.enabled;
        cfg.center = self.center.clamp(0.0, 100.0);
        cfg.range = self.range.clamp(0.0, ChannelConfig::MAX_RANGE);
        cfg.init_position = self.init_position.clamp(0.0, 100.0);
        cfg.is_pair = self.is_pair;
        cfg.pair = if self.pair_board >= 0 && self.pair_servo >= 0 {
            Some(ChannelId::new(self.pair_board as usize, self.pair_servo as usize))
        } else {
            None
        };
        cfg.is_pair_master = self.is_pair_master;
        if !self.name.is_empty() {
            cfg.name = self.name.clone();
        }
    }
}
