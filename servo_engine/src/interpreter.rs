//! Command Interpreter.
//!
//! Two entry points with different verb legality:
//!
//! - [`ServoEngine::execute_command`] (top-level): `sleep` queues itself as a
//!   delay marker, `script` starts the Script Expander, everything else runs
//!   now.
//! - [`ServoEngine::execute_command_immediate`] (queue drain, API): `sleep`
//!   and `script` are rejected.
//!
//! Both render `Success: …` / `Error: …`; nothing escapes as a panic or an
//! unhandled error.

use servo_common::consts::CHANNELS_PER_BOARD;
use tracing::{debug, info};

use crate::command::{Command, StopTarget, SystemAction, HELP_TEXT};
use crate::engine::{expand_repeat, Placement, ServoEngine};
use crate::error::CommandError;
use crate::store::ConfigSlot;

/// Render a handler result as the user-facing reply.
pub fn render(result: Result<String, CommandError>) -> String {
    match result {
        Ok(msg) => format!("Success: {msg}"),
        Err(e) => format!("Error: {e}"),
    }
}

impl ServoEngine {
    /// Top-level submission, rendered.
    pub fn execute_command(&mut self, line: &str) -> String {
        match Command::parse(line) {
            Ok(Command::Help) => HELP_TEXT.to_string(),
            parsed => render(parsed.and_then(|cmd| self.dispatch(cmd))),
        }
    }

    /// Top-level submission, typed.
    pub fn submit(&mut self, line: &str) -> Result<String, CommandError> {
        let cmd = Command::parse(line)?;
        debug!(command = line.trim(), "Command submitted");
        self.dispatch(cmd)
    }

    /// Immediate execution, rendered.
    pub fn execute_command_immediate(&mut self, line: &str) -> String {
        match Command::parse(line) {
            Ok(Command::Help) => HELP_TEXT.to_string(),
            parsed => render(parsed.and_then(|cmd| self.dispatch_immediate(cmd))),
        }
    }

    /// Immediate execution, typed. Used by the queue drain.
    pub fn submit_immediate(&mut self, line: &str) -> Result<String, CommandError> {
        let cmd = Command::parse(line)?;
        self.dispatch_immediate(cmd)
    }

    fn dispatch(&mut self, cmd: Command) -> Result<String, CommandError> {
        match cmd {
            Command::Sleep { ms } => {
                self.queue_command(&format!("sleep {ms}"), ms)?;
                Ok(format!("Sleep for {ms}ms scheduled"))
            }
            Command::Script { name } => {
                let steps = self.execute_script(&name)?;
                Ok(format!("Executing script '{name}' ({steps} commands)"))
            }
            other => self.run(other),
        }
    }

    fn dispatch_immediate(&mut self, cmd: Command) -> Result<String, CommandError> {
        match cmd {
            Command::Sleep { .. } => Err(CommandError::validation(
                "sleep is only valid in a queue or sequence context",
            )),
            Command::Script { .. } => Err(CommandError::validation(
                "script cannot be executed immediately; submit it as a top-level command",
            )),
            other => self.run(other),
        }
    }

    /// Execute every verb that behaves the same in all contexts.
    pub(crate) fn run(&mut self, cmd: Command) -> Result<String, CommandError> {
        match cmd {
            Command::Servo { target, position } => {
                let out = self.array.set_position(target, position)?;
                Ok(match out.paired {
                    Some(p) => format!(
                        "Moved servo {target} to {}% (paired {} to {}%)",
                        out.position, p.target, p.position
                    ),
                    None => format!("Moved servo {target} to {}%", out.position),
                })
            }
            Command::Sweep {
                target,
                start,
                end,
                duration_ms,
            } => {
                let (start, end) = self.start_sweep(target, start, end, duration_ms)?;
                Ok(format!(
                    "Sweeping servo {target} from {start}% to {end}% over {duration_ms}ms"
                ))
            }
            Command::Repeat { count, command } => {
                let steps = expand_repeat(count, &command, 1)?;
                let kept = self.place_steps(steps, Placement::Replace)?;
                Ok(format!("Repeating '{command}' {kept} times"))
            }
            Command::System(action) => self.run_system(action),
            Command::Config {
                target,
                field,
                value,
            } => {
                self.array.update_channel_config(target, field, &value)?;
                Ok(format!(
                    "Updated {} to {value} for servo {target}",
                    field.as_str()
                ))
            }
            Command::Pair { master, slave } => {
                self.array.pair(master, slave)?;
                Ok(format!(
                    "Paired servo {master} (master) with {slave} (slave)"
                ))
            }
            Command::Stop(target) => Ok(self.run_stop(target)),
            Command::Help => Ok(HELP_TEXT.to_string()),
            other @ (Command::Sleep { .. } | Command::Script { .. }) => Err(
                CommandError::validation(format!(
                    "'{}' cannot run in this context",
                    other.verb()
                )),
            ),
        }
    }

    fn run_system(&mut self, action: SystemAction) -> Result<String, CommandError> {
        match action {
            SystemAction::Info => {
                let boards = self.board_count();
                Ok(format!(
                    "System Info - Boards: {boards}, Total Servos: {}",
                    boards * CHANNELS_PER_BOARD
                ))
            }
            SystemAction::Init => {
                let moved = self.apply_initial_positions();
                Ok(format!(
                    "Applied initial positions to {moved} enabled servo(s)"
                ))
            }
            SystemAction::Save => self.save_configuration(ConfigSlot::Live),
            SystemAction::Load => self.load_configuration(ConfigSlot::Live),
            SystemAction::SaveOffline => self.save_configuration(ConfigSlot::Offline),
            SystemAction::LoadOffline => self.load_configuration(ConfigSlot::Offline),
            SystemAction::Scan => {
                let found = self.scan_for_boards()?;
                let ready = self.initialize_boards();
                info!(found, ready, "Rescan complete");
                Ok(format!("Found {found} board(s), {ready} initialized"))
            }
            SystemAction::Status => Ok(self.status_line()),
            SystemAction::Log => self
                .console
                .as_ref()
                .map(|c| c.to_json())
                .ok_or_else(|| CommandError::not_found("Event console not attached")),
            SystemAction::LogClear => {
                let console = self
                    .console
                    .as_ref()
                    .ok_or_else(|| CommandError::not_found("Event console not attached"))?;
                console.clear();
                Ok("Event console cleared".to_string())
            }
        }
    }

    fn run_stop(&mut self, target: StopTarget) -> String {
        match target {
            StopTarget::All => {
                let sweeps = self.stop_all_sweeps();
                let sequence = self.stop_sequence();
                let queued = self.clear_queue();
                format!(
                    "Stopped {sweeps} sweep(s), {} sequence, cleared {queued} queued command(s)",
                    if sequence { "1" } else { "no" }
                )
            }
            StopTarget::Sweeps => format!("Stopped {} sweep(s)", self.stop_all_sweeps()),
            StopTarget::Sequence => {
                if self.stop_sequence() {
                    "Sequence stopped".to_string()
                } else {
                    "No sequence running".to_string()
                }
            }
            StopTarget::Queue => format!("Cleared {} queued command(s)", self.clear_queue()),
            StopTarget::Channel(id) => {
                if self.stop_sweep(id) {
                    format!("Stopped sweep on servo {id}")
                } else {
                    format!("No sweep running on servo {id}")
                }
            }
        }
    }

    /// One-line summary of scheduler state.
    pub fn status_line(&self) -> String {
        let sequence = if self.sequence.is_active() {
            format!(
                "running step {}/{}",
                self.sequence.current_index(),
                self.sequence.len()
            )
        } else {
            "idle".to_string()
        };
        format!(
            "Boards: {}, Sweeps active: {}, Sequence: {sequence}, Queued: {}",
            self.board_count(),
            self.sweeps.active_count(),
            self.queue.len()
        )
    }
}
