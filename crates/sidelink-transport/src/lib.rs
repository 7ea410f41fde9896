//! Child process supervision for sidelink sidecars
//!
//! Owns exactly one child process for the lifetime of a connection: spawn it
//! with piped standard streams, write line-delimited frames to its stdin,
//! hand its stdout/stderr to the protocol engine's readers, and terminate it
//! on shutdown. The process handle is never shared; whoever holds the
//! [`SidecarProcess`] owns the child.
//!
//! What the child says on those streams is not this crate's concern - see
//! `sidelink-protocol` for framing and `sidelink` for routing.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod process;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use process::{SidecarConfig, SidecarProcess};
