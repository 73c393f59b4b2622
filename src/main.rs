//! vani-console - Interactive serial console for STM32 firmware debugging
//!
//! One process, one thread, blocking I/O: read a command at the prompt,
//! write it to the board, drain the reply lines, repeat. Sensor readings
//! (`T=`/`H=`/`P=` lines) land in an append-only log file; everything else
//! prints to the console.

use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vani_console::config::Config;
use vani_console::console::Console;
use vani_console::error::Result;
use vani_console::router::Router;
use vani_console::serial_io::SerialTransport;

/// Default config path, relative to the working directory
///
/// When this file is absent the built-in bench defaults apply; an
/// explicitly passed path must exist.
const DEFAULT_CONFIG_PATH: &str = "vani-console.toml";

/// Parse config path from command line arguments.
///
/// Supports:
/// - `vani-console <path>` (positional)
/// - `vani-console --config <path>` (flag-based)
/// - `vani-console -c <path>` (short flag)
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

/// Load configuration from the given path, the default path, or defaults
fn load_config() -> Result<Config> {
    match parse_config_path() {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH),
        None => Ok(Config::stm32_defaults()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("vani-console: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = load_config()?;

    // Initialize logger (RUST_LOG still overrides the configured level)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("vani-console v{} starting", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Serial port: {} at {} baud, {}ms read timeout",
        config.serial.port,
        config.serial.baud,
        config.serial.timeout_ms
    );
    log::info!("Sensor log: {}", config.log.sensor_file.display());

    // An unopenable port is the only handled error: diagnostic and
    // non-zero exit, before the command loop is ever entered.
    let transport = SerialTransport::open(
        &config.serial.port,
        config.serial.baud,
        config.serial.timeout(),
    )?;

    // Shutdown flag, set by Ctrl+C. Checked whenever a blocking call
    // returns, so an interrupt mid-prompt takes effect after Enter.
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::Relaxed);
    }) {
        log::warn!("Failed to set Ctrl-C handler: {}", e);
    }

    println!("Board connected on {}", config.serial.port);
    println!("Enter command (SENSORS / STOP / RELAY ON / RELAY OFF / STEPPER MOVE ...)");
    println!("Ctrl+C to exit\n");

    let router = Router::new(&config.log.sensor_file);
    let mut console = Console::new(transport, router, config.console.max_drain_lines);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    console.run(&mut input, &running)?;

    // Port closes when the transport drops
    println!("\nExit");
    log::info!("vani-console stopped");
    Ok(())
}
