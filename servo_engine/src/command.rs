//! Command grammar.
//!
//! One line of text is parsed into a closed [`Command`] variant by
//! [`Command::parse`], a pure function. Only static bounds are checked here;
//! checks that depend on engine state (detected board count, channel enabled)
//! happen when the command executes.
//!
//! | Verb | Args |
//! |---|---|
//! | `servo` | board servo position |
//! | `sweep` | board servo start end duration_ms |
//! | `repeat` | count command… |
//! | `system` | info\|init\|save\|load\|save-offline\|load-offline\|scan\|status\|log [clear] |
//! | `config` | board servo field value |
//! | `pair` | board1 servo1 board2 servo2 |
//! | `script` | name |
//! | `sleep` | milliseconds |
//! | `stop` | [sweeps\|sequence\|queue\|board servo] |
//! | `help` | |

use servo_common::channel::ChannelId;
use servo_common::consts::{CHANNELS_PER_BOARD, MAX_BOARDS};

use crate::error::CommandError;

/// Shortest accepted sweep [ms].
pub const MIN_SWEEP_MS: u64 = 100;
/// Longest accepted sweep [ms].
pub const MAX_SWEEP_MS: u64 = 60_000;
/// Longest accepted sleep [ms].
pub const MAX_SLEEP_MS: u64 = 10_000;
/// Most copies a `repeat` may produce.
pub const MAX_REPEAT: usize = 100;

/// `system` sub-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAction {
    Info,
    Init,
    Save,
    Load,
    SaveOffline,
    LoadOffline,
    Scan,
    Status,
    Log,
    LogClear,
}

/// Channel field addressed by `config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Enabled,
    Center,
    Range,
    InitPosition,
    IsPair,
    PairBoard,
    PairServo,
    IsPairMaster,
    Name,
}

impl ConfigField {
    pub const NAMES: &'static str =
        "enabled, center, range, initPosition, isPair, pairBoard, pairServo, isPairMaster, name";

    fn parse(text: &str) -> Option<Self> {
        let field = match text.to_ascii_lowercase().as_str() {
            "enabled" => Self::Enabled,
            "center" => Self::Center,
            "range" => Self::Range,
            "initposition" => Self::InitPosition,
            "ispair" => Self::IsPair,
            "pairboard" => Self::PairBoard,
            "pairservo" => Self::PairServo,
            "ispairmaster" => Self::IsPairMaster,
            "name" => Self::Name,
            _ => return None,
        };
        Some(field)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Center => "center",
            Self::Range => "range",
            Self::InitPosition => "initPosition",
            Self::IsPair => "isPair",
            Self::PairBoard => "pairBoard",
            Self::PairServo => "pairServo",
            Self::IsPairMaster => "isPairMaster",
            Self::Name => "name",
        }
    }
}

/// What a `stop` command halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTarget {
    All,
    Sweeps,
    Sequence,
    Queue,
    Channel(ChannelId),
}

/// One parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Servo {
        target: ChannelId,
        position: f32,
    },
    Sweep {
        target: ChannelId,
        start: f32,
        end: f32,
        duration_ms: u64,
    },
    Repeat {
        count: usize,
        command: String,
    },
    System(SystemAction),
    Config {
        target: ChannelId,
        field: ConfigField,
        value: String,
    },
    Pair {
        master: ChannelId,
        slave: ChannelId,
    },
    Script {
        name: String,
    },
    Sleep {
        ms: u64,
    },
    Stop(StopTarget),
    Help,
}

impl Command {
    /// Parse one line of text.
    ///
    /// The verb and keywords are case-insensitive; surrounding whitespace is
    /// ignored. Empty input is an error, not a no-op.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::validation("Empty command"));
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.to_ascii_lowercase();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match verb.as_str() {
            "servo" => parse_servo(&args),
            "sweep" => parse_sweep(&args),
            "repeat" => parse_repeat(rest),
            "system" => parse_system(&args),
            "config" => parse_config(rest),
            "pair" => parse_pair(&args),
            "script" => {
                if rest.is_empty() {
                    return Err(CommandError::validation(
                        "script command requires a script name. Usage: script <name>",
                    ));
                }
                Ok(Self::Script {
                    name: rest.to_string(),
                })
            }
            "sleep" => parse_sleep(&args),
            "stop" => parse_stop(&args),
            "help" => Ok(Self::Help),
            other => Err(CommandError::validation(format!(
                "Unknown command '{other}'. Type 'help' for available commands."
            ))),
        }
    }

    /// Verb keyword of this command.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Servo { .. } => "servo",
            Self::Sweep { .. } => "sweep",
            Self::Repeat { .. } => "repeat",
            Self::System(_) => "system",
            Self::Config { .. } => "config",
            Self::Pair { .. } => "pair",
            Self::Script { .. } => "script",
            Self::Sleep { .. } => "sleep",
            Self::Stop(_) => "stop",
            Self::Help => "help",
        }
    }
}

/// Extra wait after a sweep step so the sweep has finished before the next step [ms].
pub const SWEEP_SETTLE_MS: u64 = 100;

impl Command {
    /// Wait a sequence step imposes before the next one starts [ms].
    ///
    /// Derived from the verb alone: a sweep waits its duration plus
    /// [`SWEEP_SETTLE_MS`], a sleep waits its own time, everything else 0.
    pub fn step_wait_ms(&self) -> u64 {
        match self {
            Self::Sweep { duration_ms, .. } => duration_ms + SWEEP_SETTLE_MS,
            Self::Sleep { ms } => *ms,
            _ => 0,
        }
    }
}

/// Wait owed by a sequence step whose text did not parse.
///
/// Read from the raw tokens: a `sweep` line waits its last token plus
/// [`SWEEP_SETTLE_MS`], a `sleep` line its first argument when that is
/// within 1..=[`MAX_SLEEP_MS`]. Anything else waits 0.
pub fn unparsed_step_wait_ms(line: &str) -> u64 {
    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return 0;
    };
    let as_ms = |token: &str| token.parse::<u64>().ok();
    match verb.to_ascii_lowercase().as_str() {
        "sweep" => match tokens.last().and_then(as_ms) {
            Some(ms) if ms > 0 => ms.saturating_add(SWEEP_SETTLE_MS),
            _ => 0,
        },
        "sleep" => match tokens.next().and_then(as_ms) {
            Some(ms) if (1..=MAX_SLEEP_MS).contains(&ms) => ms,
            _ => 0,
        },
        _ => 0,
    }
}

/// Static usage text.
pub const HELP_TEXT: &str = "Available commands:\n\
servo <board> <servo> <position> - Move servo to position (0-100%)\n\
sweep <board> <servo> <start> <end> <duration_ms> - Sweep between positions (100-60000ms)\n\
repeat <count> <command...> - Run a command up to 100 times as a sequence\n\
system info - Show system information\n\
system init - Apply initial positions to all servos\n\
system save|load - Save or load the live configuration\n\
system save-offline|load-offline - Save or load the backup configuration\n\
system scan - Rescan the bus for boards\n\
system status - Show sweep, sequence and queue state\n\
system log [clear] - Show or clear the event console\n\
config <board> <servo> <field> <value> - Update servo configuration\n\
pair <board1> <servo1> <board2> <servo2> - Pair two servos (first is master)\n\
script <name> - Execute a saved script\n\
sleep <milliseconds> - Wait for specified time (max 10000ms)\n\
stop [sweeps|sequence|queue|<board> <servo>] - Stop running activity\n\
help - Show this help message";

// ─── Argument helpers ───────────────────────────────────────────────

fn parse_board(text: &str) -> Result<usize, CommandError> {
    let board: usize = text
        .parse()
        .map_err(|_| CommandError::validation(format!("Invalid board index '{text}'")))?;
    if board >= MAX_BOARDS {
        return Err(CommandError::validation(format!(
            "Invalid board index {board}. Valid range: 0-{}",
            MAX_BOARDS - 1
        )));
    }
    Ok(board)
}

fn parse_channel(text: &str) -> Result<usize, CommandError> {
    let channel: usize = text
        .parse()
        .map_err(|_| CommandError::validation(format!("Invalid servo index '{text}'")))?;
    if channel >= CHANNELS_PER_BOARD {
        return Err(CommandError::validation(format!(
            "Invalid servo index {channel}. Valid range: 0-{}",
            CHANNELS_PER_BOARD - 1
        )));
    }
    Ok(channel)
}

fn parse_target(board: &str, channel: &str) -> Result<ChannelId, CommandError> {
    Ok(ChannelId::new(parse_board(board)?, parse_channel(channel)?))
}

fn parse_percent(text: &str, what: &str) -> Result<f32, CommandError> {
    let value: f32 = text
        .parse()
        .map_err(|_| CommandError::validation(format!("Invalid {what} '{text}'")))?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CommandError::validation(format!(
            "{what} must be between 0.0 and 100.0"
        )));
    }
    Ok(value)
}

fn parse_millis(text: &str, what: &str) -> Result<u64, CommandError> {
    text.parse()
        .map_err(|_| CommandError::validation(format!("Invalid {what} '{text}'")))
}

// ─── Verb parsers ───────────────────────────────────────────────────

fn parse_servo(args: &[&str]) -> Result<Command, CommandError> {
    let [board, channel, position] = args else {
        return Err(CommandError::validation(
            "servo command requires 3 arguments: board servo position",
        ));
    };
    Ok(Command::Servo {
        target: parse_target(board, channel)?,
        position: parse_percent(position, "Position")?,
    })
}

fn parse_sweep(args: &[&str]) -> Result<Command, CommandError> {
    let [board, channel, start, end, duration] = args else {
        return Err(CommandError::validation(
            "sweep command requires 5 arguments: board servo start end duration_ms",
        ));
    };
    let duration_ms = parse_millis(duration, "duration")?;
    if !(MIN_SWEEP_MS..=MAX_SWEEP_MS).contains(&duration_ms) {
        return Err(CommandError::validation(format!(
            "Sweep duration must be between {MIN_SWEEP_MS} and {MAX_SWEEP_MS}ms"
        )));
    }
    Ok(Command::Sweep {
        target: parse_target(board, channel)?,
        start: parse_percent(start, "Start position")?,
        end: parse_percent(end, "End position")?,
        duration_ms,
    })
}

fn parse_repeat(rest: &str) -> Result<Command, CommandError> {
    let Some((count, command)) = split_token(rest).filter(|(_, c)| !c.trim().is_empty()) else {
        return Err(CommandError::validation(
            "repeat command requires a count and a command. Usage: repeat <count> <command>",
        ));
    };
    let count: usize = count
        .parse()
        .map_err(|_| CommandError::validation(format!("Invalid repeat count '{count}'")))?;
    if count == 0 || count > MAX_REPEAT {
        return Err(CommandError::validation(format!(
            "Repeat count must be between 1 and {MAX_REPEAT}"
        )));
    }
    let command = command.trim();
    // Reject malformed inner commands before they are copied into a sequence.
    Command::parse(command)?;
    Ok(Command::Repeat {
        count,
        command: command.to_string(),
    })
}

fn parse_system(args: &[&str]) -> Result<Command, CommandError> {
    let lowered: Vec<String> = args.iter().map(|a| a.to_ascii_lowercase()).collect();
    let action = match lowered.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["info"] => SystemAction::Info,
        ["init"] => SystemAction::Init,
        ["save"] => SystemAction::Save,
        ["load"] => SystemAction::Load,
        ["save-offline"] => SystemAction::SaveOffline,
        ["load-offline"] => SystemAction::LoadOffline,
        ["scan"] => SystemAction::Scan,
        ["status"] => SystemAction::Status,
        ["log"] => SystemAction::Log,
        ["log", "clear"] => SystemAction::LogClear,
        [] => {
            return Err(CommandError::validation(
                "system command requires arguments. Usage: system <info|init|save|load>",
            ));
        }
        _ => {
            return Err(CommandError::validation(format!(
                "Unknown system command '{}'. Available: info, init, save, load, save-offline, load-offline, scan, status, log",
                args.join(" ")
            )));
        }
    };
    Ok(Command::System(action))
}

fn parse_config(rest: &str) -> Result<Command, CommandError> {
    // The value is the remainder of the line so names may contain spaces.
    let parts = split_token(rest).and_then(|(board, rest)| {
        let (channel, rest) = split_token(rest)?;
        let (field, value) = split_token(rest)?;
        Some((board, channel, field, value.trim()))
    });
    let Some((board, channel, field, value)) = parts.filter(|p| !p.3.is_empty()) else {
        return Err(CommandError::validation(
            "config command requires 4 arguments: board servo field value",
        ));
    };
    let field = ConfigField::parse(field).ok_or_else(|| {
        CommandError::validation(format!(
            "Unknown field '{field}'. Valid fields: {}",
            ConfigField::NAMES
        ))
    })?;
    Ok(Command::Config {
        target: parse_target(board, channel)?,
        field,
        value: value.to_string(),
    })
}

/// First whitespace-delimited token and the untrimmed remainder.
fn split_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some(text.split_at(end))
}

fn parse_pair(args: &[&str]) -> Result<Command, CommandError> {
    let [board1, servo1, board2, servo2] = args else {
        return Err(CommandError::validation(
            "pair command requires 4 arguments: board1 servo1 board2 servo2",
        ));
    };
    Ok(Command::Pair {
        master: parse_target(board1, servo1)?,
        slave: parse_target(board2, servo2)?,
    })
}

fn parse_sleep(args: &[&str]) -> Result<Command, CommandError> {
    let [ms] = args else {
        return Err(CommandError::validation(
            "sleep command requires a time in milliseconds. Usage: sleep <milliseconds>",
        ));
    };
    let ms: i64 = ms
        .parse()
        .map_err(|_| CommandError::validation(format!("Invalid sleep time '{ms}'")))?;
    if ms <= 0 {
        return Err(CommandError::validation("Sleep time must be a positive number"));
    }
    if ms as u64 > MAX_SLEEP_MS {
        return Err(CommandError::validation(format!(
            "Sleep time cannot exceed {MAX_SLEEP_MS}ms (10 seconds)"
        )));
    }
    Ok(Command::Sleep { ms: ms as u64 })
}

fn parse_stop(args: &[&str]) -> Result<Command, CommandError> {
    let target = match args {
        [] => StopTarget::All,
        [what] => match what.to_ascii_lowercase().as_str() {
            "all" => StopTarget::All,
            "sweeps" => StopTarget::Sweeps,
            "sequence" => StopTarget::Sequence,
            "queue" => StopTarget::Queue,
            other => {
                return Err(CommandError::validation(format!(
                    "Unknown stop target '{other}'. Available: sweeps, sequence, queue, <board> <servo>"
                )));
            }
        },
        [board, channel] => StopTarget::Channel(parse_target(board, channel)?),
        _ => {
            return Err(CommandError::validation(
                "stop takes at most 2 arguments: stop [sweeps|sequence|queue|<board> <servo>]",
            ));
        }
    };
    Ok(Command::Stop(target))
}
