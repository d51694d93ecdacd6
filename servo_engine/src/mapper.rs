//! Position Mapper.
//!
//! Owns the board table and the channel grid, and converts logical
//! positions (0–100 %) into pulse widths written through each board's
//! exclusively owned driver handle.
//!
//! ```text
//! requested % ──► clamp to [center−range, center+range] ──► pulse µs ──► board
//!                    │
//!                    └─ pair master? ──► pairCenter − (pos − center) ──► clamp ──► paired board
//! ```

use servo_common::channel::{BoardInfo, ChannelConfig, ChannelId};
use servo_common::consts::{
    CHANNELS_PER_BOARD, MAX_BOARDS, MAX_NAME_LEN, PROBE_ADDRESSES, PULSE_MAX_US, PULSE_MIN_US,
};
use servo_common::driver::{DriverError, PwmBoard, PwmBus};
use tracing::{debug, info, warn};

use crate::command::ConfigField;
use crate::error::CommandError;

/// One detected board and its driver handle.
pub struct Board {
    pub info: BoardInfo,
    driver: Box<dyn PwmBoard>,
}

/// Mirrored write performed because the target is a pair master.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedWrite {
    pub target: ChannelId,
    pub position: f32,
}

/// Outcome of a successful position write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedPosition {
    /// Clamped position actually written [%].
    pub position: f32,
    /// Set when the write was mirrored onto a paired channel.
    pub paired: Option<PairedWrite>,
}

/// Convert a percent position into a pulse width [µs], rounded to the nearest microsecond.
#[inline]
pub fn percent_to_pulse_us(percent: f32) -> u16 {
    let p = percent.clamp(0.0, 100.0);
    let us = ((100.0 - p) * f32::from(PULSE_MIN_US) + p * f32::from(PULSE_MAX_US)) / 100.0;
    us.round() as u16
}

/// Inverse position for the slave of a pair, mirrored around each side's own center.
#[inline]
pub fn mirrored_position(master: &ChannelConfig, slave: &ChannelConfig, position: f32) -> f32 {
    slave.clamp(slave.center - (position - master.center))
}

/// Board table plus per-channel configuration and last written positions.
pub struct ServoArray {
    boards: heapless::Vec<Board, MAX_BOARDS>,
    channels: [[ChannelConfig; CHANNELS_PER_BOARD]; MAX_BOARDS],
    positions: [[Option<f32>; CHANNELS_PER_BOARD]; MAX_BOARDS],
}

impl Default for ServoArray {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoArray {
    /// Empty board table, every channel at factory defaults.
    pub fn new() -> Self {
        Self {
            boards: heapless::Vec::new(),
            channels: std::array::from_fn(|b| {
                std::array::from_fn(|c| ChannelConfig::default_for(ChannelId::new(b, c)))
            }),
            positions: [[None; CHANNELS_PER_BOARD]; MAX_BOARDS],
        }
    }

    // ─── Board table ────────────────────────────────────────────────

    /// Drop every held driver and rediscover boards on `bus`.
    ///
    /// Channel configuration is keyed by board index and survives a rescan.
    pub fn scan(&mut self, bus: &mut dyn PwmBus) -> Result<usize, DriverError> {
        self.boards.clear();
        self.positions = [[None; CHANNELS_PER_BOARD]; MAX_BOARDS];

        let found = bus.discover(&PROBE_ADDRESSES)?;
        for driver in found {
            let address = driver.address();
            let board = Board {
                info: BoardInfo {
                    address,
                    detected: true,
                    enabled: true,
                    name: BoardInfo::default_name(address),
                },
                driver,
            };
            if self.boards.push(board).is_err() {
                warn!(address, "Board table full, ignoring board");
                break;
            }
            info!("Found PWM board at 0x{address:02X}");
        }

        info!(count = self.boards.len(), bus = bus.name(), "Board scan complete");
        Ok(self.boards.len())
    }

    /// Set the PWM frequency on every detected board.
    ///
    /// A board that fails to initialize is disabled; the others are unaffected.
    pub fn initialize(&mut self, frequency_hz: u16) -> usize {
        let mut ready = 0;
        for board in self.boards.iter_mut() {
            match board.driver.initialize(frequency_hz) {
                Ok(()) => {
                    ready += 1;
                    debug!(address = board.info.address, frequency_hz, "Board initialized");
                }
                Err(e) => {
                    board.info.enabled = false;
                    warn!(address = board.info.address, error = %e, "Board initialization failed");
                }
            }
        }
        ready
    }

    #[inline]
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn boards(&self) -> impl Iterator<Item = &BoardInfo> {
        self.boards.iter().map(|b| &b.info)
    }

    pub fn board(&self, index: usize) -> Option<&BoardInfo> {
        self.boards.get(index).map(|b| &b.info)
    }

    pub fn board_mut(&mut self, index: usize) -> Option<&mut BoardInfo> {
        self.boards.get_mut(index).map(|b| &mut b.info)
    }

    /// Fail unless `id` addresses a channel on a detected board.
    pub fn check_target(&self, id: ChannelId) -> Result<(), CommandError> {
        if id.board >= self.boards.len() {
            let available = match self.boards.len() {
                0 => "none".to_string(),
                n => format!("0-{}", n - 1),
            };
            return Err(CommandError::validation(format!(
                "Invalid board index {}. Available boards: {available}",
                id.board
            )));
        }
        if id.channel >= CHANNELS_PER_BOARD {
            return Err(CommandError::validation(format!(
                "Invalid servo index {}. Valid range: 0-{}",
                id.channel,
                CHANNELS_PER_BOARD - 1
            )));
        }
        Ok(())
    }

    // ─── Channel grid ───────────────────────────────────────────────

    pub fn channel(&self, id: ChannelId) -> Option<&ChannelConfig> {
        self.channels.get(id.board)?.get(id.channel)
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut ChannelConfig> {
        self.channels.get_mut(id.board)?.get_mut(id.channel)
    }

    /// Last position written to `id`, if any since the last scan.
    pub fn position(&self, id: ChannelId) -> Option<f32> {
        *self.positions.get(id.board)?.get(id.channel)?
    }

    /// Reset one board's channels to factory defaults.
    pub fn reset_board_channels(&mut self, board: usize) {
        if let Some(row) = self.channels.get_mut(board) {
            for (c, cfg) in row.iter_mut().enumerate() {
                *cfg = ChannelConfig::default_for(ChannelId::new(board, c));
            }
        }
    }

    // ─── Writes ─────────────────────────────────────────────────────

    /// Move a channel to `requested` %, clamped to its configured range.
    ///
    /// Pair masters mirror the write onto their slave. A failed or skipped
    /// mirror is logged; the master's write stands.
    pub fn set_position(
        &mut self,
        id: ChannelId,
        requested: f32,
    ) -> Result<MappedPosition, CommandError> {
        if let Err(e) = self.check_target(id) {
            warn!(target_channel = %id, error = %e, "Position write rejected");
            return Err(e);
        }
        let cfg = &self.channels[id.board][id.channel];
        if !cfg.enabled {
            warn!(target_channel = %id, "Position write rejected, servo disabled");
            return Err(CommandError::validation(format!("Servo {id} is disabled")));
        }

        let position = cfg.clamp(requested);
        let mirror = if cfg.propagates() { cfg.pair } else { None };
        let master = cfg.clone();

        self.write_percent(id, position)?;
        debug!(target_channel = %id, requested, position, "Servo positioned");

        let paired = mirror.and_then(|pair| self.mirror_write(&master, id, pair, position));
        Ok(MappedPosition { position, paired })
    }

    fn mirror_write(
        &mut self,
        master: &ChannelConfig,
        master_id: ChannelId,
        pair: ChannelId,
        position: f32,
    ) -> Option<PairedWrite> {
        if pair.board >= self.boards.len() || pair.channel >= CHANNELS_PER_BOARD {
            warn!(master = %master_id, pair = %pair, "Paired servo not found, mirror skipped");
            return None;
        }
        let slave = &self.channels[pair.board][pair.channel];
        if !slave.enabled {
            warn!(master = %master_id, pair = %pair, "Paired servo disabled, mirror skipped");
            return None;
        }

        let mirrored = mirrored_position(master, slave, position);
        match self.write_percent(pair, mirrored) {
            Ok(()) => {
                debug!(pair = %pair, position = mirrored, "Paired servo mirrored");
                Some(PairedWrite {
                    target: pair,
                    position: mirrored,
                })
            }
            Err(e) => {
                warn!(pair = %pair, error = %e, "Paired servo write failed");
                None
            }
        }
    }

    /// Raw write of an already clamped position. Boards that are absent or
    /// disabled are skipped silently.
    fn write_percent(&mut self, id: ChannelId, percent: f32) -> Result<(), DriverError> {
        let Some(board) = self.boards.get_mut(id.board) else {
            return Ok(());
        };
        if !board.info.detected || !board.info.enabled {
            return Ok(());
        }
        let pulse = percent_to_pulse_us(percent);
        board.driver.write_pulse_us(id.channel as u8, pulse)?;
        self.positions[id.board][id.channel] = Some(percent);
        Ok(())
    }

    /// Move every enabled channel on every detected board to its initial position.
    ///
    /// Returns the number of channels moved.
    pub fn apply_initial_positions(&mut self) -> usize {
        let mut moved = 0;
        for board in 0..self.boards.len() {
            for channel in 0..CHANNELS_PER_BOARD {
                let id = ChannelId::new(board, channel);
                let cfg = &self.channels[board][channel];
                if !cfg.enabled {
                    continue;
                }
                let init = cfg.init_position;
                match self.set_position(id, init) {
                    Ok(_) => moved += 1,
                    Err(e) => warn!(target_channel = %id, error = %e, "Initial position failed"),
                }
            }
        }
        info!(moved, "Applied initial positions");
        moved
    }

    // ─── Configuration ──────────────────────────────────────────────

    /// Designate `master` as pair master linked to `slave`.
    ///
    /// Overwrites any earlier pairing of either channel.
    pub fn pair(&mut self, master: ChannelId, slave: ChannelId) -> Result<(), CommandError> {
        for id in [master, slave] {
            if id.board >= self.boards.len() || id.channel >= CHANNELS_PER_BOARD {
                return Err(CommandError::not_found(format!(
                    "Cannot pair: servo {id} does not exist"
                )));
            }
        }

        let m = &mut self.channels[master.board][master.channel];
        m.is_pair = true;
        m.is_pair_master = true;
        m.pair = Some(slave);

        let s = &mut self.channels[slave.board][slave.channel];
        s.is_pair = true;
        s.is_pair_master = false;
        s.pair = None;

        info!(master = %master, slave = %slave, "Servos paired");
        Ok(())
    }

    /// Update one field of a channel's configuration from its text value.
    pub fn update_channel_config(
        &mut self,
        id: ChannelId,
        field: ConfigField,
        value: &str,
    ) -> Result<(), CommandError> {
        self.check_target(id)?;
        let cfg = &mut self.channels[id.board][id.channel];
        let link = cfg.pair;

        match field {
            ConfigField::Enabled => cfg.enabled = parse_bool(field, value)?,
            ConfigField::Center => cfg.center = parse_ranged(field, value, 100.0)?,
            ConfigField::Range => cfg.range = parse_ranged(field, value, ChannelConfig::MAX_RANGE)?,
            ConfigField::InitPosition => cfg.init_position = parse_ranged(field, value, 100.0)?,
            ConfigField::IsPair => cfg.is_pair = parse_bool(field, value)?,
            ConfigField::IsPairMaster => cfg.is_pair_master = parse_bool(field, value)?,
            ConfigField::PairBoard => {
                cfg.pair = parse_index(field, value, MAX_BOARDS)?
                    .map(|board| ChannelId::new(board, link.map_or(0, |p| p.channel)));
            }
            ConfigField::PairServo => {
                cfg.pair = parse_index(field, value, CHANNELS_PER_BOARD)?
                    .map(|channel| ChannelId::new(link.map_or(0, |p| p.board), channel));
            }
            ConfigField::Name => {
                if value.len() > MAX_NAME_LEN {
                    return Err(CommandError::validation(format!(
                        "name cannot exceed {MAX_NAME_LEN} characters"
                    )));
                }
                cfg.name = value.to_string();
            }
        }

        info!(target_channel = %id, field = field.as_str(), value, "Servo configuration updated");
        Ok(())
    }
}

fn parse_bool(field: ConfigField, value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(CommandError::validation(format!(
            "{} must be true or false",
            field.as_str()
        ))),
    }
}

fn parse_ranged(field: ConfigField, value: &str, max: f32) -> Result<f32, CommandError> {
    let v: f32 = value.parse().map_err(|_| {
        CommandError::validation(format!("Invalid {} value '{value}'", field.as_str()))
    })?;
    if !v.is_finite() || !(0.0..=max).contains(&v) {
        return Err(CommandError::validation(format!(
            "{} must be between 0 and {max}",
            field.as_str()
        )));
    }
    Ok(v)
}

/// `-1` clears the link.
fn parse_index(field: ConfigField, value: &str, limit: usize) -> Result<Option<usize>, CommandError> {
    let v: i64 = value.parse().map_err(|_| {
        CommandError::validation(format!("Invalid {} value '{value}'", field.as_str()))
    })?;
    match v {
        -1 => Ok(None),
        v if v >= 0 && (v as usize) < limit => Ok(Some(v as usize)),
        _ => Err(CommandError::validation(format!(
            "{} must be -1 or between 0 and {}",
            field.as_str(),
            limit - 1
        ))),
    }
}
