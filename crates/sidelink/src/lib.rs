//! Async client for a sidecar process speaking line-delimited JSON-RPC
//!
//! A host application spawns one long-lived sidecar at startup and treats it
//! as a service: requests go down the child's stdin, responses and
//! server-initiated notifications come back multiplexed on its stdout, one
//! JSON object per line. This crate owns that whole conversation.
//!
//! # Architecture
//!
//! - **[`SidecarLink`]**: spawns the process, runs the stream reader, and
//!   exposes `call` / `subscribe` / `close`
//! - **Correlation**: every call carries a fresh UUID id; responses are
//!   matched by id only, never by send order
//! - **Notifications**: messages with a `method` and no `id` fan out to the
//!   handlers registered for that method
//! - **State**: a watchable [`LinkState`] signal gates callers while the
//!   connection is down
//!
//! # Usage
//!
//! ```ignore
//! use sidelink::{SidecarConfig, SidecarLink};
//! use serde_json::json;
//!
//! let link = SidecarLink::connect(SidecarConfig::new("peak-sidecar")).await?;
//!
//! let _sub = link.subscribe("terminal/output", |params| {
//!     println!("terminal says: {}", params);
//! });
//!
//! let entries = link.call("read_dir", json!({"path": "/"})).await?;
//! link.close().await;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod state;
pub mod subscription;

mod router;

// Re-export commonly used types at crate level
pub use client::SidecarLink;
pub use error::{LinkError, Result};
pub use state::LinkState;
pub use subscription::Subscription;

// The spawn configuration lives with the supervisor but is part of this
// crate's surface.
pub use sidelink_transport::SidecarConfig;
