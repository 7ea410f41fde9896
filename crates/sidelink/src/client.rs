//! The sidecar link: connection lifecycle, calls, and the stream reader
//!
//! One [`SidecarLink`] owns one child process for the process's whole life.
//! A single reader task drains the child's stdout independently of how many
//! callers are awaiting results, so a slow caller can never stall
//! notification delivery. All caller interaction goes through [`call`],
//! [`subscribe`], and the state signal; the process handle itself is never
//! exposed.
//!
//! [`call`]: SidecarLink::call
//! [`subscribe`]: SidecarLink::subscribe

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::ChildStderr;
use tokio::sync::{Mutex, watch};

use sidelink_protocol::{LineBuffer, ToolCallRequest, parse_line};
use sidelink_transport::{SidecarConfig, SidecarProcess, TransportError};

use crate::error::{LinkError, Result};
use crate::router::Router;
use crate::state::LinkState;
use crate::subscription::Subscription;

const READ_CHUNK: usize = 8 * 1024;

/// Shared state behind one link
pub(crate) struct LinkInner {
    pub(crate) router: Arc<Router>,
    process: Mutex<Option<SidecarProcess>>,
    state: watch::Sender<LinkState>,
    shutting_down: AtomicBool,
    config: SidecarConfig,
}

/// Client for one long-lived sidecar process
///
/// Cheap to clone; all clones share the same connection. Multiple tasks may
/// issue [`call`](Self::call)s concurrently - responses are correlated by id,
/// not by order, so the sidecar is free to answer out of sequence.
#[derive(Clone)]
pub struct SidecarLink {
    inner: Arc<LinkInner>,
}

impl SidecarLink {
    /// Spawn the sidecar and start reading its output
    ///
    /// A spawn failure is fatal for the connection: the error is returned
    /// here once and nothing retries.
    pub async fn connect(config: SidecarConfig) -> Result<Self> {
        let (state, _) = watch::channel(LinkState::Connecting);

        let mut process = match SidecarProcess::spawn(&config) {
            Ok(process) => process,
            Err(e) => {
                let reason = e.to_string();
                state.send_replace(LinkState::Failed(reason.clone()));
                return Err(LinkError::Spawn(reason));
            }
        };

        let stdout = process.take_stdout().ok_or_else(|| {
            LinkError::Transport(TransportError::Process("stdout not captured".to_string()))
        })?;
        let stderr = process.take_stderr();

        state.send_replace(LinkState::Connected);

        let inner = Arc::new(LinkInner {
            router: Arc::new(Router::new()),
            process: Mutex::new(Some(process)),
            state,
            shutting_down: AtomicBool::new(false),
            config,
        });

        if let Some(stderr) = stderr {
            tokio::spawn(relay_stderr(stderr));
        }
        tokio::spawn(read_loop(
            stdout,
            inner.router.clone(),
            Arc::downgrade(&inner),
        ));

        Ok(Self { inner })
    }

    /// Invoke a sidecar tool and await its result
    ///
    /// Resolves with the response's `result` payload, or fails with the
    /// remote error's message, a timeout after the configured deadline
    /// (default 15 s), or a connection-lost error if the sidecar goes away
    /// first. Issued while not connected, it fails immediately without
    /// registering anything.
    pub async fn call(&self, name: impl Into<String>, arguments: Value) -> Result<Value> {
        if !self.inner.state.borrow().is_connected() {
            return Err(LinkError::NotConnected);
        }

        let request = ToolCallRequest::new(name, arguments);
        let id = request.id().clone();
        let frame = request.to_frame()?;

        let rx = self.inner.router.register(id.clone());

        // Teardown publishes its state before draining the map, so a waiter
        // registered after the drain always sees a non-connected state here
        // and backs out instead of hanging.
        if !self.inner.state.borrow().is_connected() {
            self.inner.router.remove(&id);
            return Err(LinkError::NotConnected);
        }

        {
            let mut guard = self.inner.process.lock().await;
            let process = guard.as_mut().ok_or(LinkError::NotConnected)?;
            if let Err(e) = process.write_line(&frame).await {
                self.inner.router.remove(&id);
                tracing::warn!("write failed for call {}: {}", id, e);
                return Err(LinkError::ConnectionLost);
            }
        }

        match tokio::time::timeout(self.inner.config.call_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(LinkError::ConnectionLost),
            Err(_) => {
                // Forget the id so a late response is unroutable noise.
                self.inner.router.remove(&id);
                tracing::debug!(
                    "call {} timed out after {:?}",
                    id,
                    self.inner.config.call_timeout
                );
                Err(LinkError::Timeout)
            }
        }
    }

    /// Register a handler for a server-initiated notification method
    ///
    /// The handler runs on the reader task, in wire arrival order, every time
    /// the sidecar emits that method. Keep it quick; heavy work belongs on a
    /// channel. The returned guard unregisters exactly this handler.
    pub fn subscribe(
        &self,
        method: impl Into<String>,
        handler: impl Fn(Value) + Send + Sync + 'static,
    ) -> Subscription {
        let method = method.into();
        let token = self
            .inner
            .router
            .subscribe(method.clone(), Arc::new(handler));
        Subscription::new(Arc::downgrade(&self.inner), method, token)
    }

    /// Current connection state
    pub fn state(&self) -> LinkState {
        self.inner.state.borrow().clone()
    }

    /// Whether calls can currently be issued
    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().is_connected()
    }

    /// Observe connection-state transitions
    pub fn watch_state(&self) -> watch::Receiver<LinkState> {
        self.inner.state.subscribe()
    }

    /// Shut the link down
    ///
    /// Rejects every outstanding call with a connection-lost error, then
    /// terminates the sidecar (stdin close, grace period, kill). Idempotent;
    /// repeated calls are no-ops. The child is also reaped if the link is
    /// simply dropped.
    pub async fn close(&self) {
        if self.inner.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("closing sidecar link");

        self.inner.state.send_replace(LinkState::Closed);
        self.inner.router.fail_all();

        let mut guard = self.inner.process.lock().await;
        if let Some(mut process) = guard.take() {
            process.shutdown(self.inner.config.shutdown_grace).await;
        }
    }
}

/// Drain the child's stdout, frame it into lines, and route each message
///
/// Holds the router strongly but the link only weakly: dropping the last
/// [`SidecarLink`] releases the process (killing the child), which ends this
/// loop via EOF instead of keeping the connection alive forever.
async fn read_loop<R>(mut stdout: R, router: Arc<Router>, link: Weak<LinkInner>)
where
    R: AsyncRead + Unpin,
{
    let mut buffer = LineBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    let reason = loop {
        match stdout.read(&mut chunk).await {
            Ok(0) => break None,
            Ok(n) => {
                buffer.extend(&chunk[..n]);
                while let Some(line) = buffer.drain_line() {
                    dispatch_line(&router, &line);
                }
            }
            Err(e) => break Some(format!("read error: {}", e)),
        }
    };

    disconnected(router, link, reason).await;
}

/// Parse and route one framed line; bad lines are logged and skipped
fn dispatch_line(router: &Router, line: &[u8]) {
    let line = line.trim_ascii();
    if line.is_empty() {
        return;
    }

    match parse_line(line) {
        Ok(message) => router.dispatch(message),
        Err(e) => {
            tracing::warn!(
                "dropping malformed line: {} ({})",
                String::from_utf8_lossy(line),
                e
            );
        }
    }
}

/// Handle the end of the child's output stream
///
/// During a deliberate shutdown the state is already `Closed` and the map
/// already drained; anything else is an abnormal exit: flip the state to
/// `Failed` first, then reject whatever is still pending.
async fn disconnected(router: Arc<Router>, link: Weak<LinkInner>, reason: Option<String>) {
    if let Some(inner) = link.upgrade() {
        if !inner.shutting_down.load(Ordering::SeqCst) {
            let mut detail =
                reason.unwrap_or_else(|| "sidecar closed its output stream".to_string());
            if let Some(process) = inner.process.lock().await.as_mut() {
                if let Some(status) = process.exit_status() {
                    detail = format!("sidecar exited with {}", status);
                }
            }
            tracing::error!("connection lost: {}", detail);
            inner.state.send_replace(LinkState::Failed(detail));
        }
    }
    router.fail_all();
}

/// Relay the sidecar's stderr into the host's logs, line by line
async fn relay_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::warn!("sidecar stderr: {}", line);
    }
}
