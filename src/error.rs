//! Error types for the motion logger

use std::path::PathBuf;

use thiserror::Error;

/// Error type for logger operations
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Underlying file or console I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sensor read failure
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// LED matrix write failure
    #[error("Display error: {0}")]
    Display(String),

    /// Digit with no mode assigned to it
    #[error("No mode for digit '{0}' (expected 1, 2 or 3)")]
    UnmappedDigit(char),

    /// Operator input closed while a prompt was waiting
    #[error("Operator input closed")]
    EndOfInput,

    /// Prompt abandoned because the run is stopping
    #[error("Interrupted while waiting for operator input")]
    Interrupted,

    /// Name that cannot be used in a record file name
    #[error("Invalid operator name: {0}")]
    InvalidName(String),

    /// Session destination already exists
    #[error("Record file already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// Sample runtime went backwards
    #[error("Runtime {current:.6}s precedes previous row at {previous:.6}s")]
    NonMonotonicRuntime { previous: f64, current: f64 },
}

impl From<nix::errno::Errno> for LoggerError {
    fn from(errno: nix::errno::Errno) -> Self {
        LoggerError::Io(errno.into())
    }
}

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, LoggerError>;
