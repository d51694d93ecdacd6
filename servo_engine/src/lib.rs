//! # Servo Engine Library
//!
//! Cooperative command-execution engine for arrays of multi-channel PWM
//! servo boards. A single polling entry point, [`ServoEngine::tick`], runs in
//! fixed order:
//!
//! 1. **Sweep Engine** - advances every active linear interpolation
//! 2. **Sequence Runner** - executes at most one step of the active sequence
//! 3. **Timed Queue** - drains every due command in submission order
//!
//! Nothing blocks. Waiting is always a future timestamp compared against the
//! engine's monotonic [`clock::Clock`].
//!
//! ## Bounded State
//!
//! Board table, channel grid, sweep slot pool, queue, sequence and script
//! library are fixed-capacity (`heapless`) arenas addressed by index, so
//! the memory ceiling is known at startup.
//!
//! ## Command Surface
//!
//! Text commands (`servo`, `sweep`, `repeat`, `system`, `config`, `pair`,
//! `script`, `sleep`, `stop`, `help`) are parsed into [`command::Command`]
//! and executed through [`ServoEngine::execute_command`] (top-level) or
//! [`ServoEngine::execute_command_immediate`] (queue / sequence / API).

pub mod clock;
pub mod command;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod mapper;
pub mod queue;
pub mod script;
pub mod sequence;
pub mod store;
pub mod sweep;

pub use crate::engine::{EngineSettings, ServoEngine};
pub use crate::error::CommandError;
