//! Unified error types for the kiosk watchdog

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for watchdog operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Lock errors
    #[error("Failed to open lock file '{path}': {source}")]
    LockOpen { path: PathBuf, source: io::Error },

    #[error("Failed to lock '{path}': {errno}")]
    LockFailed { path: PathBuf, errno: nix::errno::Errno },

    // Config errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    // Service manager errors
    #[error("Service manager query for '{unit}' failed: {message}")]
    ServiceQuery { unit: String, message: String },

    #[error("Unrecognized state '{state}' reported for '{unit}'")]
    UnknownServiceState { unit: String, state: String },

    #[error("Restart request for '{unit}' failed: {message}")]
    RestartFailed { unit: String, message: String },

    // Subprocess errors
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Command '{command}' timed out after {timeout_ms}ms")]
    CommandTimeout { command: String, timeout_ms: u128 },

    // Output errors
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for watchdog operations
pub type Result<T> = std::result::Result<T, Error>;
