//! Engine context and tick loop.
//!
//! [`ServoEngine`] is the one process-wide context object: it owns the board
//! table, the channel grid, the sweep pool, the timed queue, the active
//! sequence and the script library, together with the bus, the config
//! store and the clock it was constructed with.
//!
//! # Tick Order
//!
//! ```text
//! tick()
//!  ├─ update_sweeps()            write every active interpolation
//!  ├─ update_command_sequence()  run at most one due step
//!  └─ process_queue()            drain due entries, front first
//! ```
//!
//! Each sub-step reads the clock once.

use servo_common::channel::{ChannelConfig, ChannelId};
use servo_common::consts::{CHANNELS_PER_BOARD, DEFAULT_PWM_FREQUENCY_HZ};
use servo_common::driver::PwmBus;
use servo_common::record::{BoardRecord, ChannelRecord, ConfigRecord};
use tracing::{debug, error, info, trace, warn};

use crate::clock::Clock;
use crate::command::{unparsed_step_wait_ms, Command, ConfigField, MAX_SWEEP_MS, MIN_SWEEP_MS};
use crate::console::EventConsole;
use crate::error::CommandError;
use crate::mapper::{MappedPosition, ServoArray};
use crate::queue::TimedQueue;
use crate::script::{split_commands, Script, ScriptLibrary, MAX_SCRIPT_DEPTH};
use crate::sequence::{SequencePoll, SequenceRunner, SequenceStep};
use crate::store::{ConfigSlot, ConfigStore};
use crate::sweep::SweepPool;

/// Construction-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// PWM frequency applied to every board on initialization.
    pub pwm_frequency_hz: u16,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
        }
    }
}

/// Where expanded steps go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Start a new sequence, discarding the running one.
    Replace,
    /// Continue the running sequence (or start one if idle).
    Append,
}

/// Cooperative servo command engine.
pub struct ServoEngine {
    pub(crate) array: ServoArray,
    pub(crate) queue: TimedQueue,
    pub(crate) sweeps: SweepPool,
    pub(crate) sequence: SequenceRunner,
    pub(crate) scripts: ScriptLibrary,
    pub(crate) console: Option<EventConsole>,
    bus: Box<dyn PwmBus>,
    store: Box<dyn ConfigStore>,
    clock: Box<dyn Clock>,
    settings: EngineSettings,
    ticks: u64,
    last_step_result: Option<Result<String, CommandError>>,
}

impl ServoEngine {
    /// Build an engine. No hardware is touched until [`startup`](Self::startup)
    /// or [`scan_for_boards`](Self::scan_for_boards).
    pub fn new(
        bus: Box<dyn PwmBus>,
        store: Box<dyn ConfigStore>,
        clock: Box<dyn Clock>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            array: ServoArray::new(),
            queue: TimedQueue::new(),
            sweeps: SweepPool::new(),
            sequence: SequenceRunner::new(),
            scripts: ScriptLibrary::new(),
            console: None,
            bus,
            store,
            clock,
            settings,
            ticks: 0,
            last_step_result: None,
        }
    }

    /// Expose an event console through `system log`.
    pub fn attach_console(&mut self, console: EventConsole) {
        self.console = Some(console);
    }

    /// Scan, initialize, load the live configuration and apply initial positions.
    ///
    /// Failures are logged; the engine stays usable with whatever was found.
    pub fn startup(&mut self) -> usize {
        info!(bus = self.bus.name(), "Servo engine starting");
        if let Err(e) = self.scan_for_boards() {
            error!(error = %e, "Board scan failed");
        }
        self.initialize_boards();
        match self.load_configuration(ConfigSlot::Live) {
            Ok(msg) => info!("{msg}"),
            Err(e) => warn!(error = %e, "Live configuration not applied"),
        }
        self.array.apply_initial_positions();
        self.array.board_count()
    }

    // ─── Boards ─────────────────────────────────────────────────────

    /// Rediscover boards. Previously held driver handles are released first.
    pub fn scan_for_boards(&mut self) -> Result<usize, CommandError> {
        let found = self.array.scan(self.bus.as_mut())?;
        if found == 0 {
            warn!("No PWM boards detected");
        }
        Ok(found)
    }

    /// Apply the configured PWM frequency to every detected board.
    pub fn initialize_boards(&mut self) -> usize {
        self.array.initialize(self.settings.pwm_frequency_hz)
    }

    pub fn apply_initial_positions(&mut self) -> usize {
        self.array.apply_initial_positions()
    }

    // ─── Channels ───────────────────────────────────────────────────

    /// Move a channel to `percent`, clamped to its range, mirroring onto its pair.
    pub fn set_channel_position(
        &mut self,
        id: ChannelId,
        percent: f32,
    ) -> Result<MappedPosition, CommandError> {
        self.array.set_position(id, percent)
    }

    pub fn update_channel_config(
        &mut self,
        id: ChannelId,
        field: ConfigField,
        value: &str,
    ) -> Result<(), CommandError> {
        self.array.update_channel_config(id, field, value)
    }

    pub fn pair_channels(&mut self, master: ChannelId, slave: ChannelId) -> Result<(), CommandError> {
        self.array.pair(master, slave)
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn board_count(&self) -> usize {
        self.array.board_count()
    }

    pub fn servo_array(&self) -> &ServoArray {
        &self.array
    }

    pub fn channel(&self, id: ChannelId) -> Option<&ChannelConfig> {
        self.array.channel(id)
    }

    /// Last position written to `id`.
    pub fn position(&self, id: ChannelId) -> Option<f32> {
        self.array.position(id)
    }

    pub fn sweeps(&self) -> &SweepPool {
        &self.sweeps
    }

    pub fn queue(&self) -> &TimedQueue {
        &self.queue
    }

    pub fn sequence(&self) -> &SequenceRunner {
        &self.sequence
    }

    pub fn scripts(&self) -> &ScriptLibrary {
        &self.scripts
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Outcome of the most recent sequence step.
    pub fn last_step_result(&self) -> Option<&Result<String, CommandError>> {
        self.last_step_result.as_ref()
    }

    /// True when no sweep, sequence or queued command is pending.
    pub fn is_idle(&self) -> bool {
        self.sweeps.active_count() == 0 && !self.sequence.is_active() && self.queue.is_empty()
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// One cooperative scheduling pass. Never blocks.
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.update_sweeps();
        self.update_command_sequence();
        self.process_queue();
    }

    /// Advance every active sweep. O(1) when none is running.
    pub fn update_sweeps(&mut self) {
        if self.sweeps.active_count() == 0 {
            return;
        }
        let now = self.clock.now_ms();
        for sample in self.sweeps.advance(now) {
            match self.array.set_position(sample.target, sample.position) {
                Ok(_) if sample.finished => {
                    debug!(target_channel = %sample.target, position = sample.position, "Sweep completed");
                }
                Ok(_) => {}
                Err(e) => {
                    self.sweeps.stop(sample.target);
                    warn!(target_channel = %sample.target, error = %e, "Sweep aborted");
                }
            }
        }
    }

    /// Run at most one due step of the active sequence.
    pub fn update_command_sequence(&mut self) {
        let now = self.clock.now_ms();
        let step = match self.sequence.poll(now) {
            SequencePoll::Ready(step) => step,
            SequencePoll::Completed { steps } => {
                info!(steps, "Sequence finished");
                return;
            }
            SequencePoll::Skipped => {
                trace!("Blank sequence step skipped");
                return;
            }
            SequencePoll::Idle | SequencePoll::Waiting => return,
        };

        let index = self.sequence.current_index();
        let (result, wait_ms) = match Command::parse(&step.command) {
            Ok(cmd) => {
                let wait = cmd.step_wait_ms();
                (self.run_step(cmd, step.depth), wait)
            }
            Err(e) => (Err(e), unparsed_step_wait_ms(&step.command)),
        };
        self.sequence.finish_step(now, wait_ms);

        match &result {
            Ok(msg) => info!(step = index, command = %step.command, wait_ms, "{msg}"),
            Err(e) => warn!(step = index, command = %step.command, error = %e, "Sequence step failed"),
        }
        self.last_step_result = Some(result);
    }

    /// Execute every due queue entry, front first.
    pub fn process_queue(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let now = self.clock.now_ms();
        while let Some(entry) = self.queue.pop_due(now) {
            if is_sleep_marker(&entry.command) {
                trace!(due_ms = entry.due_ms, "Sleep marker consumed");
                continue;
            }
            match self.submit_immediate(&entry.command) {
                Ok(msg) => info!(command = %entry.command, "Queued command: {msg}"),
                Err(e) => warn!(command = %entry.command, error = %e, "Queued command failed"),
            }
        }
    }

    /// One sequence step. `script` and `repeat` expand one level deeper and
    /// continue the running sequence; `sleep` only contributes its wait.
    fn run_step(&mut self, cmd: Command, depth: usize) -> Result<String, CommandError> {
        match cmd {
            Command::Script { name } => {
                let steps = self.expand_script(&name, depth + 1)?;
                let added = self.place_steps(steps, Placement::Append)?;
                Ok(format!("Script '{name}' appended {added} step(s)"))
            }
            Command::Repeat { count, command } => {
                let steps = expand_repeat(count, &command, depth + 1)?;
                let added = self.place_steps(steps, Placement::Append)?;
                Ok(format!("Repeat appended {added} step(s)"))
            }
            Command::Sleep { ms } => Ok(format!("Sleeping {ms}ms")),
            other => self.run(other),
        }
    }

    // ─── Sweeps ─────────────────────────────────────────────────────

    /// Start (or restart) a sweep on `target`. The start position is written now.
    pub fn start_sweep(
        &mut self,
        target: ChannelId,
        start: f32,
        end: f32,
        duration_ms: u64,
    ) -> Result<(f32, f32), CommandError> {
        self.array.check_target(target)?;
        if duration_ms == 0 {
            return Err(CommandError::validation("Sweep duration must be positive"));
        }
        if !(MIN_SWEEP_MS..=MAX_SWEEP_MS).contains(&duration_ms) {
            return Err(CommandError::validation(format!(
                "Sweep duration must be between {MIN_SWEEP_MS} and {MAX_SWEEP_MS}ms"
            )));
        }
        let cfg = self
            .array
            .channel(target)
            .ok_or_else(|| CommandError::validation(format!("Invalid servo {target}")))?;
        if !cfg.enabled {
            warn!(target_channel = %target, "Sweep rejected, servo disabled");
            return Err(CommandError::validation(format!("Servo {target} is disabled")));
        }
        let (start, end) = (cfg.clamp(start), cfg.clamp(end));

        let now = self.clock.now_ms();
        self.sweeps.start(target, start, end, now, duration_ms)?;
        if let Err(e) = self.array.set_position(target, start) {
            warn!(target_channel = %target, error = %e, "Sweep start position not written");
        }
        info!(target_channel = %target, start, end, duration_ms, "Sweep started");
        Ok((start, end))
    }

    pub fn stop_sweep(&mut self, target: ChannelId) -> bool {
        let stopped = self.sweeps.stop(target);
        if stopped {
            info!(target_channel = %target, "Sweep stopped");
        }
        stopped
    }

    pub fn stop_all_sweeps(&mut self) -> usize {
        let stopped = self.sweeps.stop_all();
        if stopped > 0 {
            info!(stopped, "All sweeps stopped");
        }
        stopped
    }

    // ─── Queue ──────────────────────────────────────────────────────

    /// Schedule `command` to run `delay_ms` from now.
    pub fn queue_command(&mut self, command: &str, delay_ms: u64) -> Result<u64, CommandError> {
        let command = command.trim();
        Command::parse(command)?;
        let now = self.clock.now_ms();
        self.queue.push(command, now, delay_ms)
    }

    /// Drop every entry not yet executed.
    pub fn clear_queue(&mut self) -> usize {
        let dropped = self.queue.clear();
        if dropped > 0 {
            info!(dropped, "Command queue cleared");
        }
        dropped
    }

    // ─── Sequences ──────────────────────────────────────────────────

    /// Replace the running sequence with `commands`.
    pub fn start_command_sequence<I, S>(&mut self, commands: I) -> Result<usize, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<SequenceStep> = commands
            .into_iter()
            .map(|c| SequenceStep::new(c, 0))
            .collect();
        self.place_steps(steps, Placement::Replace)
    }

    pub fn stop_sequence(&mut self) -> bool {
        let stopped = self.sequence.stop();
        if stopped {
            info!("Command sequence stopped");
        }
        stopped
    }

    pub(crate) fn place_steps(
        &mut self,
        steps: Vec<SequenceStep>,
        placement: Placement,
    ) -> Result<usize, CommandError> {
        if steps.is_empty() {
            return Err(CommandError::validation("Sequence has no commands"));
        }
        let requested = steps.len();
        let now = self.clock.now_ms();

        let kept = match placement {
            Placement::Append if self.sequence.is_active() => {
                if self.sequence.remaining_capacity() == 0 {
                    return Err(CommandError::exhausted(
                        "Sequence full, no steps could be appended",
                    ));
                }
                self.sequence.append(steps)
            }
            _ => self.sequence.start(steps, now),
        };
        if kept < requested {
            warn!(requested, kept, "Sequence truncated");
        }
        Ok(kept)
    }

    // ─── Scripts ────────────────────────────────────────────────────

    /// Expand a stored script into steps tagged with `depth`.
    pub(crate) fn expand_script(
        &self,
        name: &str,
        depth: usize,
    ) -> Result<Vec<SequenceStep>, CommandError> {
        if depth > MAX_SCRIPT_DEPTH {
            error!(name, depth, "Script recursion limit reached");
            return Err(CommandError::RecursionLimit {
                name: name.to_string(),
                limit: MAX_SCRIPT_DEPTH,
            });
        }
        let script = self
            .scripts
            .find(name)
            .ok_or_else(|| CommandError::not_found(format!("Script '{name}' not found")))?;
        if !script.enabled {
            return Err(CommandError::validation(format!(
                "Script '{}' is disabled",
                script.name
            )));
        }
        let commands = split_commands(&script.commands);
        if commands.is_empty() {
            return Err(CommandError::validation(format!(
                "Script '{}' has no commands",
                script.name
            )));
        }
        debug!(name = %script.name, depth, commands = commands.len(), "Script expanded");
        Ok(commands
            .into_iter()
            .map(|c| SequenceStep::new(c, depth))
            .collect())
    }

    /// Run a stored script as a new sequence.
    pub fn execute_script(&mut self, name: &str) -> Result<usize, CommandError> {
        let steps = self.expand_script(name, 1)?;
        let kept = self.place_steps(steps, Placement::Replace)?;
        info!(name, steps = kept, "Executing script");
        Ok(kept)
    }

    /// Run the script at `index` as a new sequence.
    pub fn execute_script_at(&mut self, index: usize) -> Result<usize, CommandError> {
        let name = self
            .scripts
            .get(index)
            .map(|s| s.name.clone())
            .ok_or_else(|| CommandError::not_found(format!("Script index {index} not found")))?;
        self.execute_script(&name)
    }

    pub fn add_script(
        &mut self,
        name: &str,
        description: &str,
        commands: &str,
    ) -> Result<usize, CommandError> {
        self.scripts.add(name, description, commands)
    }

    pub fn update_script(
        &mut self,
        index: usize,
        name: &str,
        description: &str,
        commands: &str,
    ) -> Result<(), CommandError> {
        self.scripts.update(index, name, description, commands)
    }

    pub fn delete_script(&mut self, index: usize) -> Result<Script, CommandError> {
        self.scripts.delete(index)
    }

    pub fn set_script_enabled(&mut self, index: usize, enabled: bool) -> Result<(), CommandError> {
        self.scripts.set_enabled(index, enabled)
    }

    // ─── Configuration store ────────────────────────────────────────

    /// Snapshot of boards, channels and scripts in persisted shape.
    pub fn configuration_record(&self) -> ConfigRecord {
        let boards = self
            .array
            .boards()
            .enumerate()
            .map(|(b, info)| BoardRecord {
                address: info.address,
                name: info.name.clone(),
                enabled: info.enabled,
                servos: (0..CHANNELS_PER_BOARD)
                    .filter_map(|c| self.array.channel(ChannelId::new(b, c)))
                    .map(ChannelRecord::from)
                    .collect(),
            })
            .collect();
        ConfigRecord {
            boards,
            scripts: Some(self.scripts.records()),
        }
    }

    pub fn save_configuration(&mut self, slot: ConfigSlot) -> Result<String, CommandError> {
        let record = self.configuration_record();
        self.store.save(slot, &record)?;
        Ok(format!(
            "Saved {slot} configuration ({} board(s), {} script(s))",
            record.boards.len(),
            self.scripts.len()
        ))
    }

    /// Load a slot onto the detected boards.
    ///
    /// Board records are matched by index and address; a mismatch skips that
    /// board. Scripts are replaced only when the record carries them.
    pub fn load_configuration(&mut self, slot: ConfigSlot) -> Result<String, CommandError> {
        let Some(record) = self.store.load(slot)? else {
            return Ok(format!("No {slot} configuration stored, defaults kept"));
        };
        let applied = self.apply_record(&record);
        Ok(format!(
            "Loaded {slot} configuration ({applied} board(s), {} script(s))",
            self.scripts.len()
        ))
    }

    fn apply_record(&mut self, record: &ConfigRecord) -> usize {
        let mut applied = 0;
        for (b, board_rec) in record.boards.iter().enumerate() {
            let Some(info) = self.array.board_mut(b) else {
                debug!(board = b, "Stored board not detected, skipped");
                continue;
            };
            if info.address != board_rec.address {
                warn!(
                    board = b,
                    stored = board_rec.address,
                    detected = info.address,
                    "Stored board address mismatch, skipped"
                );
                continue;
            }
            if !board_rec.name.is_empty() {
                info.name = board_rec.name.clone();
            }
            info.enabled = board_rec.enabled;

            for (c, servo) in board_rec.servos.iter().take(CHANNELS_PER_BOARD).enumerate() {
                if let Some(cfg) = self.array.channel_mut(ChannelId::new(b, c)) {
                    servo.apply_to(cfg);
                }
            }
            applied += 1;
        }
        if let Some(scripts) = &record.scripts {
            self.scripts.replace_all(scripts);
        }
        applied
    }
}

/// `repeat` expansion: `count` copies of `command` at `depth`.
pub(crate) fn expand_repeat(
    count: usize,
    command: &str,
    depth: usize,
) -> Result<Vec<SequenceStep>, CommandError> {
    if depth > MAX_SCRIPT_DEPTH {
        return Err(CommandError::RecursionLimit {
            name: command.to_string(),
            limit: MAX_SCRIPT_DEPTH,
        });
    }
    Ok((0..count)
        .map(|_| SequenceStep::new(command, depth))
        .collect())
}

fn is_sleep_marker(command: &str) -> bool {
    matches!(Command::parse(command), Ok(Command::Sleep { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use servo_hal::{SimulationBus, SimulationMonitor};

    fn engine(addresses: &[u8]) -> (ServoEngine, ManualClock, SimulationMonitor) {
        let bus = SimulationBus::new(addresses.to_vec());
        let monitor = bus.monitor();
        let clock = ManualClock::new(0);
        let mut engine = ServoEngine::new(
            Box::new(bus),
            Box::new(MemoryStore::new()),
            Box::new(clock.clone()),
            EngineSettings::default(),
        );
        engine.startup();
        (engine, clock, monitor)
    }

    fn enable(engine: &mut ServoEngine, id: ChannelId) {
        engine.array.channel_mut(id).unwrap().enabled = true;
    }

    #[test]
    fn startup_scans_and_initializes() {
        let (engine, _, monitor) = engine(&[0x40, 0x41]);
        assert_eq!(engine.board_count(), 2);
        assert_eq!(monitor.frequency_hz(0x41), Some(50));
        assert_eq!(monitor.scan_count(), 1);
        assert!(engine.is_idle());
    }

    #[test]
    fn sweep_rejects_disabled_channel() {
        let (mut engine, _, _) = engine(&[0x40]);
        let err = engine
            .start_sweep(ChannelId::new(0, 0), 0.0, 100.0, 1000)
            .unwrap_err();
        assert!(err.to_string().contains("disabled"));
        assert_eq!(engine.sweeps().active_count(), 0);
    }

    #[test]
    fn sweep_endpoints_are_clamped_and_start_written() {
        let (mut engine, clock, monitor) = engine(&[0x40]);
        let id = ChannelId::new(0, 1);
        enable(&mut engine, id);
        engine.array.channel_mut(id).unwrap().range = 25.0;

        let (start, end) = engine.start_sweep(id, 0.0, 100.0, 500).unwrap();
        assert_eq!((start, end), (25.0, 75.0));
        assert_eq!(monitor.pulse_us(0x40, 1), Some(1250));

        clock.set(500);
        engine.tick();
        assert_eq!(engine.position(id), Some(75.0));
        assert_eq!(engine.sweeps().active_count(), 0);
    }

    #[test]
    fn sweep_stops_when_channel_is_disabled_midway() {
        let (mut engine, clock, _) = engine(&[0x40]);
        let id = ChannelId::new(0, 2);
        enable(&mut engine, id);
        engine.start_sweep(id, 0.0, 100.0, 1000).unwrap();

        engine.array.channel_mut(id).unwrap().enabled = false;
        clock.set(100);
        engine.tick();
        assert_eq!(engine.sweeps().active_count(), 0);
    }

    #[test]
    fn queue_drains_in_order_and_consumes_sleep_markers() {
        let (mut engine, clock, monitor) = engine(&[0x40]);
        enable(&mut engine, ChannelId::new(0, 0));
        engine.queue_command("sleep 50", 50).unwrap();
        engine.queue_command("servo 0 0 10", 10).unwrap();

        clock.set(20);
        engine.tick();
        assert_eq!(monitor.pulse_us(0x40, 0), None);
        clock.set(50);
        engine.tick();
        assert_eq!(monitor.pulse_us(0x40, 0), Some(1100));
        assert!(engine.queue().is_empty());
    }

    #[test]
    fn queue_rejects_garbage_up_front() {
        let (mut engine, _, _) = engine(&[0x40]);
        assert!(engine.queue_command("wiggle", 10).is_err());
        assert!(engine.queue().is_empty());
    }

    #[test]
    fn script_expansion_respects_depth_ceiling() {
        let (mut engine, _, _) = engine(&[0x40]);
        engine.add_script("a", "", "help").unwrap();
        assert_eq!(engine.expand_script("a", MAX_SCRIPT_DEPTH).unwrap().len(), 1);
        assert!(matches!(
            engine.expand_script("a", MAX_SCRIPT_DEPTH + 1),
            Err(CommandError::RecursionLimit { .. })
        ));
    }

    #[test]
    fn disabled_or_missing_script_fails() {
        let (mut engine, _, _) = engine(&[0x40]);
        engine.add_script("off", "", "help").unwrap();
        engine.set_script_enabled(0, false).unwrap();
        assert!(engine.execute_script("off").is_err());
        assert!(matches!(
            engine.execute_script("nope"),
            Err(CommandError::NotFound(_))
        ));
        assert!(!engine.sequence().is_active());
    }

    #[test]
    fn save_then_load_restores_channels_and_scripts() {
        let (mut engine, _, _) = engine(&[0x40]);
        let id = ChannelId::new(0, 5);
        enable(&mut engine, id);
        engine.array.channel_mut(id).unwrap().center = 40.0;
        engine.add_script("wave", "hello", "servo 0 5 10").unwrap();
        engine.save_configuration(ConfigSlot::Offline).unwrap();

        engine.array.reset_board_channels(0);
        engine.delete_script(0).unwrap();
        engine.load_configuration(ConfigSlot::Offline).unwrap();

        let cfg = engine.channel(id).unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.center, 40.0);
        assert_eq!(engine.scripts().find("wave").unwrap().description, "hello");
    }

    #[test]
    fn load_skips_board_with_mismatched_address() {
        let (mut engine, _, _) = engine(&[0x40]);
        let mut record = engine.configuration_record();
        record.boards[0].address = 0x44;
        record.boards[0].servos[0].enabled = true;
        assert_eq!(engine.apply_record(&record), 0);
        assert!(!engine.channel(ChannelId::new(0, 0)).unwrap().enabled);
    }

    #[test]
    fn missing_slot_keeps_defaults() {
        let (mut engine, _, _) = engine(&[0x40]);
        let msg = engine.load_configuration(ConfigSlot::Live).unwrap();
        assert!(msg.contains("defaults kept"));
    }

    #[test]
    fn repeat_expansion_is_depth_checked() {
        assert_eq!(expand_repeat(3, "help", 1).unwrap().len(), 3);
        assert!(expand_repeat(3, "help", MAX_SCRIPT_DEPTH + 1).is_err());
    }
}
