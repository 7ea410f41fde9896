//! Error types for sidecar calls and connection management
//!
//! Errors tied to one call resolve only that call; errors tied to the
//! connection as a whole reject every outstanding call and flip the link
//! state. Malformed inbound lines have no variant here on purpose: they are
//! logged and dropped inside the reader, never surfaced to a caller.

use std::fmt;

use sidelink_protocol::ProtocolError;
use sidelink_transport::TransportError;

/// Result type for link operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors that can occur on a sidecar link
#[derive(Debug)]
pub enum LinkError {
    /// The sidecar process failed to start; fatal for the connection
    Spawn(String),

    /// A call was issued while the link was not connected
    NotConnected,

    /// The sidecar answered this call with an error payload
    Remote(String),

    /// No response arrived within the configured deadline
    Timeout,

    /// The sidecar exited or the link was closed while the call was pending
    ConnectionLost,

    /// An outbound frame failed to serialize
    Protocol(ProtocolError),

    /// Supervision-level failure while setting up the connection
    Transport(TransportError),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(msg) => write!(f, "Failed to start sidecar: {}", msg),
            Self::NotConnected => write!(f, "Not connected to the sidecar"),
            Self::Remote(msg) => write!(f, "Sidecar error: {}", msg),
            Self::Timeout => write!(f, "Request timed out"),
            Self::ConnectionLost => write!(f, "Connection to the sidecar was lost"),
            Self::Protocol(err) => write!(f, "Protocol error: {}", err),
            Self::Transport(err) => write!(f, "Transport error: {}", err),
        }
    }
}

impl std::error::Error for LinkError {}

impl PartialEq for LinkError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Spawn(a), Self::Spawn(b)) => a == b,
            (Self::Remote(a), Self::Remote(b)) => a == b,
            (Self::NotConnected, Self::NotConnected) => true,
            (Self::Timeout, Self::Timeout) => true,
            (Self::ConnectionLost, Self::ConnectionLost) => true,
            (Self::Protocol(a), Self::Protocol(b)) => a.to_string() == b.to_string(),
            (Self::Transport(a), Self::Transport(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<ProtocolError> for LinkError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            LinkError::NotConnected.to_string(),
            "Not connected to the sidecar"
        );
        assert_eq!(
            LinkError::Remote("boom".to_string()).to_string(),
            "Sidecar error: boom"
        );
        assert_eq!(LinkError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_equality_by_variant() {
        assert_eq!(LinkError::Timeout, LinkError::Timeout);
        assert_ne!(LinkError::Timeout, LinkError::ConnectionLost);
        assert_eq!(
            LinkError::Remote("a".to_string()),
            LinkError::Remote("a".to_string())
        );
        assert_ne!(
            LinkError::Remote("a".to_string()),
            LinkError::Remote("b".to_string())
        );
    }
}
