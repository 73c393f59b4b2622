//! Error types for the console

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Console error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial device could not be opened (missing, busy, or permission denied)
    #[error("Failed to open serial port {path}: {source}")]
    PortUnavailable {
        /// Port path that was requested
        path: String,
        /// Underlying serialport error
        source: serialport::Error,
    },

    /// I/O error (port read/write, sensor log append, stdin/stdout)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read
    #[error("Config read error: {0}")]
    ConfigRead(String),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
