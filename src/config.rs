//! Configuration for the serial console
//!
//! Loads configuration from a TOML file with the minimal parameters needed
//! to talk to the board and log its sensor output.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub serial: SerialConfig,
    pub log: LogConfig,
    pub console: ConsoleConfig,
    pub logging: LoggingConfig,
}

/// Serial link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Serial port the board is connected to
    ///
    /// On Linux this is usually /dev/ttyACM0 or /dev/ttyUSB0.
    pub port: String,
    /// Baud rate (the firmware ships with 115200)
    pub baud: u32,
    /// Per-line read timeout in milliseconds
    ///
    /// A reply drain ends on the first read that times out, so this is
    /// also the worst-case wait for a command that produces no output.
    pub timeout_ms: u64,
}

/// Sensor log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// File that sensor data lines are appended to
    pub sensor_file: PathBuf,
}

/// Console behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Maximum reply lines drained per command
    ///
    /// Bounds the drain loop so a firmware bug that streams forever cannot
    /// starve the prompt. The cap is generous; hitting it logs a warning.
    pub max_drain_lines: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl SerialConfig {
    /// Read timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// - `path`: Path to TOML configuration file
    ///
    /// # Returns
    /// Parsed configuration or error
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigRead(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for an STM32 on the usual Linux CDC-ACM port
    ///
    /// Suitable for bench use without a config file. Anything else should
    /// use a proper TOML configuration file.
    pub fn stm32_defaults() -> Self {
        Self {
            serial: SerialConfig {
                port: "/dev/ttyACM0".to_string(),
                baud: 115200,
                timeout_ms: 1000,
            },
            log: LogConfig {
                sensor_file: PathBuf::from("sensors.txt"),
            },
            console: ConsoleConfig {
                max_drain_lines: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::stm32_defaults()
    }
}
