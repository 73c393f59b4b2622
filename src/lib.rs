//! vani-console - Interactive serial console for STM32 firmware debugging
//!
//! Forwards typed commands to a serial-connected board and routes its reply
//! lines: sensor readings go to a timestamped append-only log file,
//! everything else to the operator's console.

pub mod config;
pub mod console;
pub mod error;
pub mod router;
pub mod serial_io;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
