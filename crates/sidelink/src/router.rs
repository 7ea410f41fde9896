//! Message routing: pending-call correlation and notification fan-out
//!
//! One router per link. The pending map holds exactly the calls still
//! awaiting a result; an entry leaves the map the moment it is resolved,
//! rejected, timed out, or the connection is torn down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use sidelink_protocol::{InboundMessage, RequestId};

use crate::error::LinkError;

/// Outcome delivered to a waiting caller
pub(crate) type CallOutcome = std::result::Result<Value, LinkError>;

/// A registered notification callback
pub(crate) type NotificationHandler = std::sync::Arc<dyn Fn(Value) + Send + Sync>;

struct PendingCall {
    created_at: Instant,
    tx: oneshot::Sender<CallOutcome>,
}

/// Shared routing state for one link
///
/// Both maps sit behind short, non-awaiting critical sections; unsubscription
/// also runs from `Drop`, which rules out an async lock.
pub(crate) struct Router {
    pending: Mutex<HashMap<RequestId, PendingCall>>,
    subscriptions: Mutex<HashMap<String, HashMap<u64, NotificationHandler>>>,
    next_token: AtomicU64,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        }
    }

    /// Record a waiter for the given correlation id
    pub(crate) fn register(&self, id: RequestId) -> oneshot::Receiver<CallOutcome> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(
            id,
            PendingCall {
                created_at: Instant::now(),
                tx,
            },
        );
        rx
    }

    /// Drop a waiter (timeout or failed write); returns whether it was still
    /// registered
    pub(crate) fn remove(&self, id: &RequestId) -> bool {
        self.pending.lock().remove(id).is_some()
    }

    /// Number of calls still awaiting a result
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Route one classified message
    pub(crate) fn dispatch(&self, message: InboundMessage) {
        match message {
            InboundMessage::Response(frame) => {
                let id = RequestId::from_string(frame.id.clone());
                match self.pending.lock().remove(&id) {
                    Some(call) => {
                        tracing::debug!(
                            "call {} settled after {:?}",
                            frame.id,
                            call.created_at.elapsed()
                        );
                        let outcome = frame.outcome().map_err(|e| LinkError::Remote(e.message));
                        let _ = call.tx.send(outcome);
                    }
                    None => {
                        tracing::debug!("dropping response for unknown id {}", frame.id);
                    }
                }
            }
            InboundMessage::Notification(frame) => {
                let handlers: Vec<NotificationHandler> = self
                    .subscriptions
                    .lock()
                    .get(&frame.method)
                    .map(|set| set.values().cloned().collect())
                    .unwrap_or_default();

                // Handlers run outside the lock so a callback may subscribe
                // or unsubscribe.
                for handler in &handlers {
                    handler(frame.params.clone());
                }
            }
            InboundMessage::Unroutable(payload) => {
                tracing::debug!("dropping unroutable message: {}", payload);
            }
        }
    }

    /// Reject every outstanding call with a connection-lost error
    ///
    /// Leaves the pending map empty. Used on teardown and abnormal exit so
    /// no waiter hangs until its individual timer.
    pub(crate) fn fail_all(&self) {
        let drained: Vec<PendingCall> = {
            let mut pending = self.pending.lock();
            pending.drain().map(|(_, call)| call).collect()
        };
        if drained.is_empty() {
            return;
        }

        tracing::warn!("rejecting {} outstanding call(s): connection lost", drained.len());
        for call in drained {
            let _ = call.tx.send(Err(LinkError::ConnectionLost));
        }
    }

    /// Register a handler under a method name; the token removes exactly it
    pub(crate) fn subscribe(&self, method: String, handler: NotificationHandler) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.subscriptions
            .lock()
            .entry(method)
            .or_default()
            .insert(token, handler);
        token
    }

    /// Remove one handler; a no-op when the token is already gone
    pub(crate) fn unsubscribe(&self, method: &str, token: u64) {
        let mut subscriptions = self.subscriptions.lock();
        if let Some(handlers) = subscriptions.get_mut(method) {
            handlers.remove(&token);
            if handlers.is_empty() {
                subscriptions.remove(method);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, method: &str) -> usize {
        self.subscriptions
            .lock()
            .get(method)
            .map_or(0, |handlers| handlers.len())
    }
}
