//! Event console.
//!
//! Keeps the last [`MAX_CONSOLE_MESSAGES`] log events in memory so they can
//! be read back through the command surface (`system log`). Events arrive
//! through [`ConsoleLayer`], a `tracing_subscriber` layer installed next to
//! the regular formatter.

use heapless::Deque;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Ring capacity.
pub const MAX_CONSOLE_MESSAGES: usize = 100;

/// Least severe level the console keeps.
const CAPTURE_LEVEL: Level = Level::INFO;

/// One captured event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleMessage {
    /// Time since console creation, `H:MM:SS.mmm`.
    pub timestamp: String,
    pub message: String,
    /// `error`, `warning`, `info` or `debug`.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize)]
struct ConsoleDump<'a> {
    messages: &'a [ConsoleMessage],
}

/// Bounded in-memory log ring. Clones share the same ring.
#[derive(Debug, Clone)]
pub struct EventConsole {
    ring: Arc<Mutex<Deque<ConsoleMessage, MAX_CONSOLE_MESSAGES>>>,
    started: Instant,
}

impl Default for EventConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl EventConsole {
    pub fn new() -> Self {
        Self {
            ring: Arc::new(Mutex::new(Deque::new())),
            started: Instant::now(),
        }
    }

    /// Record a message, evicting the oldest once full.
    pub fn push(&self, kind: &str, message: impl Into<String>) {
        let entry = ConsoleMessage {
            timestamp: format_elapsed(self.started.elapsed().as_millis() as u64),
            message: message.into(),
            kind: kind.to_string(),
        };
        let mut ring = self.ring.lock();
        if ring.is_full() {
            ring.pop_front();
        }
        let _ = ring.push_back(entry);
    }

    /// Snapshot, oldest first.
    pub fn messages(&self) -> Vec<ConsoleMessage> {
        self.ring.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    pub fn clear(&self) {
        self.ring.lock().clear();
    }

    /// `{"messages":[{"timestamp":…,"message":…,"type":…}]}`
    pub fn to_json(&self) -> String {
        let messages = self.messages();
        serde_json::to_string(&ConsoleDump {
            messages: &messages,
        })
        .unwrap_or_else(|_| String::from("{\"messages\":[]}"))
    }
}

/// `H:MM:SS.mmm`
pub fn format_elapsed(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1_000) % 60;
    format!("{hours}:{minutes:02}:{seconds:02}.{:03}", ms % 1_000)
}

fn kind_of(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warning",
        Level::INFO => "info",
        _ => "debug",
    }
}

// ─── tracing integration ────────────────────────────────────────────

/// Layer mirroring INFO and more severe events into an [`EventConsole`].
pub struct ConsoleLayer {
    console: EventConsole,
}

impl ConsoleLayer {
    pub fn new(console: EventConsole) -> Self {
        Self { console }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level();
        if *level > CAPTURE_LEVEL {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        visitor.message.push_str(&visitor.fields);
        self.console.push(kind_of(level), visitor.message);
    }
}
