//! Sidecar process spawning and lifecycle
//!
//! Spawns the configured executable with piped standard streams and keeps
//! exclusive ownership of the handle. Termination is guaranteed on every exit
//! path: explicit [`SidecarProcess::shutdown`]/[`SidecarProcess::kill`], or
//! kill-on-drop when the handle goes away without either.

use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use crate::error::{Result, TransportError};

/// Configuration for spawning a sidecar process
///
/// The child inherits the host's environment and working directory; entries
/// in [`env`](Self::with_env) overlay the inherited environment. No arguments
/// are required for baseline operation.
#[derive(Clone, Debug)]
pub struct SidecarConfig {
    /// Path to or name of the sidecar executable
    pub program: String,

    /// Arguments to pass to the sidecar
    pub args: Vec<String>,

    /// Extra environment variables, overlaid on the inherited environment
    pub env: HashMap<String, String>,

    /// Deadline for each outstanding call
    pub call_timeout: Duration,

    /// How long a deliberate shutdown waits after closing stdin before
    /// killing the child
    pub shutdown_grace: Duration,
}

impl SidecarConfig {
    /// Create a configuration for the given executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            call_timeout: Duration::from_secs(15),
            shutdown_grace: Duration::from_secs(2),
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for the child
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Override the per-call deadline (default 15 seconds)
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Override the shutdown grace period (default 2 seconds)
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

/// Handle to a running sidecar process
///
/// Exposes the child's stdin as a line-oriented write channel and transfers
/// stdout/stderr to the caller's reader tasks. Exclusively owned; dropping
/// the handle kills the child if it is still running.
#[derive(Debug)]
pub struct SidecarProcess {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl SidecarProcess {
    /// Spawn the configured executable
    ///
    /// A spawn failure (binary not found, permission denied) is fatal for the
    /// connection and reported as [`TransportError::Spawn`]; nothing retries.
    pub fn spawn(config: &SidecarConfig) -> Result<Self> {
        tracing::info!("spawning sidecar: {} {:?}", config.program, config.args);

        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| TransportError::Spawn(format!("{}: {}", config.program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Process("failed to capture stdin".to_string()))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        tracing::debug!("sidecar running with pid {:?}", child.id());

        Ok(Self {
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout,
            stderr,
        })
    }

    /// OS process id, while the child is running
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Take ownership of the child's stdout stream
    ///
    /// Returns `None` on the second call; there is only one reader.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Take ownership of the child's stderr stream
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Append a serialized frame plus a line terminator to the child's stdin
    ///
    /// Fails when the process has already exited or its stdin was closed;
    /// callers treat that the same as a rejected pending call.
    pub async fn write_line(&mut self, frame: &[u8]) -> Result<()> {
        if let Ok(Some(status)) = self.child.try_wait() {
            return Err(TransportError::Process(format!(
                "sidecar exited with {}",
                status
            )));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| TransportError::Process("stdin already closed".to_string()))?;

        stdin.write_all(frame).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Exit status, if the child has already terminated
    pub fn exit_status(&mut self) -> Option<ExitStatus> {
        self.child.try_wait().ok().flatten()
    }

    /// Whether the child is still running
    pub fn is_alive(&mut self) -> bool {
        self.exit_status().is_none()
    }

    /// Shut the child down, gently first
    ///
    /// Closes stdin so a well-behaved sidecar can exit on EOF, waits up to
    /// `grace`, then kills whatever is left. Safe to call on an already-dead
    /// process.
    pub async fn shutdown(&mut self, grace: Duration) {
        self.stdin.take();

        tokio::select! {
            status = self.child.wait() => {
                tracing::info!("sidecar exited with status {:?}", status);
            }
            _ = tokio::time::sleep(grace) => {
                tracing::warn!("sidecar did not exit within {:?}, killing", grace);
                self.kill().await;
            }
        }
    }

    /// Send the termination signal and reap the child
    ///
    /// Idempotent: killing an already-stopped process is a no-op.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!("kill after exit: {}", e);
        }
    }
}
