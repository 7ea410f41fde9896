//! Transport error types

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while supervising the sidecar process
#[derive(Error, Debug)]
pub enum TransportError {
    /// The sidecar executable failed to start (missing binary, permissions)
    #[error("Failed to spawn sidecar: {0}")]
    Spawn(String),

    /// I/O failure on one of the child's standard streams
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The child process is not in a usable state
    #[error("Process error: {0}")]
    Process(String),
}
