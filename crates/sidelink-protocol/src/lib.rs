//! Wire types and line framing for the sidelink sidecar protocol
//!
//! The sidecar speaks newline-delimited UTF-8 JSON over its standard streams.
//! This crate models both directions of that channel as pure data:
//!
//! - **Outbound**: [`request`] - correlation ids and the `tools/call` frame
//! - **Inbound**: [`message`] - parsing a line and classifying it as a
//!   response, a notification, or noise
//! - **Framing**: [`framing`] - accumulating raw output chunks and splitting
//!   them on line boundaries
//! - **Errors**: [`error`] - malformed-input errors
//!
//! # Design Principles
//!
//! - **Zero I/O**: nothing here touches a process or a stream; the transport
//!   and client crates own those concerns
//! - **Chunk-agnostic**: a byte stream split at arbitrary boundaries frames
//!   into the same sequence of messages as the whole stream at once
//! - **Lossy on bad lines**: one unparseable line is an error for that line
//!   only, never for the connection

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod framing;
pub mod message;
pub mod request;

// Re-export commonly used types at crate level
pub use error::{ProtocolError, Result};
pub use framing::LineBuffer;
pub use message::{InboundMessage, NotificationFrame, RemoteError, ResponseFrame, parse_line};
pub use request::{RequestId, ToolCallRequest};
