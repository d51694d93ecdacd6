//! # Servo Engine Binary
//!
//! Line-oriented command console for a servo array. Reads commands from
//! stdin, prints each result and keeps ticking the engine in between.
//!
//! # Usage
//!
//! ```bash
//! # Run with the default config (config/servo.toml)
//! servo_engine
//!
//! # Pick a config and a bus driver
//! servo_engine --config /etc/servo/servo.toml --driver simulation
//!
//! # Verbose JSON logging
//! servo_engine -v --json
//! ```

#![deny(warnings)]

use clap::Parser;
use servo_common::config::{ConfigError, TomlConfig};
use servo_engine::clock::MonotonicClock;
use servo_engine::config::EngineConfig;
use servo_engine::console::{ConsoleLayer, EventConsole};
use servo_engine::store::JsonFileStore;
use servo_engine::{EngineSettings, ServoEngine};
use servo_hal::BusRegistry;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Servo Engine - cooperative command execution for PWM servo arrays
#[derive(Parser, Debug)]
#[command(name = "servo_engine")]
#[command(version)]
#[command(about = "Cooperative command-execution engine for multi-board PWM servo arrays")]
#[command(long_about = None)]
struct Args {
    /// Path to the engine configuration file
    #[arg(short, long, default_value = "config/servo.toml")]
    config: PathBuf,

    /// Bus driver to use (overrides hardware.driver)
    #[arg(short, long)]
    driver: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    let console = EventConsole::new();
    setup_tracing(&args, &config, console.clone());

    if let Err(e) = run(args, config, console) {
        error!("Servo engine failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(path: &std::path::Path) -> Result<EngineConfig, ConfigError> {
    let config = match EngineConfig::from_toml_file(path) {
        Ok(config) => config,
        Err(ConfigError::Missing(_)) => {
            eprintln!("No config at {}, using defaults", path.display());
            EngineConfig::default()
        }
        Err(e) => return Err(e),
    };
    config.validate()?;
    Ok(config)
}

fn run(
    args: Args,
    config: EngineConfig,
    console: EventConsole,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let driver = args.driver.unwrap_or_else(|| config.hardware.driver.clone());
    let registry = BusRegistry::with_builtin();
    let bus = registry.create_bus(&driver, &config.hardware.bus_settings())?;
    info!("Using bus driver '{}'", driver);

    let mut engine = ServoEngine::new(
        bus,
        Box::new(JsonFileStore::new(&config.store.dir)),
        Box::new(MonotonicClock::new()),
        EngineSettings {
            pwm_frequency_hz: config.hardware.pwm_frequency_hz,
        },
    );
    engine.attach_console(console);
    let boards = engine.startup();
    info!("Ready with {} board(s). Type 'help' for commands.", boards);

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    let lines = spawn_stdin_reader();
    let interval = Duration::from_millis(config.engine.tick_interval_ms);
    let mut input_open = true;

    while running.load(Ordering::SeqCst) {
        while input_open {
            match lines.try_recv() {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => println!("{}", engine.execute_command(&line)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("Input closed, finishing pending work");
                    input_open = false;
                }
            }
        }

        engine.tick();

        if !input_open && engine.is_idle() {
            break;
        }
        std::thread::sleep(interval);
    }

    if !engine.is_idle() {
        warn!("Shutting down with pending work: {}", engine.status_line());
    }
    info!("Servo engine stopped after {} ticks", engine.tick_count());
    Ok(())
}

/// Forward stdin lines to the tick loop.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Setup tracing subscriber based on CLI arguments and config.
fn setup_tracing(args: &Args, config: &EngineConfig, console: EventConsole) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.shared.log_level.into()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let console_layer = ConsoleLayer::new(console);

    if args.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(console_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(console_layer)
            .init();
    }
}
