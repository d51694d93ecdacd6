//! Command error taxonomy.
//!
//! Every failure inside the engine is one of these variants. None of them is
//! fatal: the interpreter boundary renders them as `Error: …` result strings.

use servo_common::driver::DriverError;
use thiserror::Error;

use crate::store::StoreError;

/// Error raised by a command handler or scheduling operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// Bad verb, out-of-range index or value, malformed argument count.
    #[error("{0}")]
    Validation(String),

    /// No free sweep slot, queue full, script or sequence capacity reached.
    #[error("{0}")]
    ResourceExhausted(String),

    /// Script expansion nested too deeply (self-referential scripts).
    #[error("Script recursion limit ({limit}) reached while expanding '{name}'")]
    RecursionLimit {
        /// Script whose expansion was refused.
        name: String,
        /// Depth ceiling.
        limit: usize,
    },

    /// Unknown script name/index or invalid pairing target.
    #[error("{0}")]
    NotFound(String),

    /// Board driver rejected a write.
    #[error("Hardware error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration store failed.
    #[error("Configuration store error: {0}")]
    Store(#[from] StoreError),
}

impl CommandError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
