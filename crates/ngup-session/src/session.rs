//! Tunnel session orchestration
//!
//! One [`TunnelSession`] supervises one agent run: it spawns the
//! subprocess, drains stdout and stderr line by line, walks the readiness
//! state machine, and reports the discovered tunnels through a
//! [`StatusSink`]. The draining loop is the only reader of the agent's
//! output and the only writer of session state, so no locking is needed.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use ngup_core::NgupError;

use crate::api::ControlApi;
use crate::detect::{NgrokLogDetector, ReadinessDetector};
use crate::invocation::ProcessInvocation;

/// Write-only line interfaces the session reports through.
pub trait StatusSink: Send {
    /// One line of informational status output
    fn line(&mut self, line: &str);

    /// One line of error output (agent stderr, fatal errors)
    fn error(&mut self, line: &str);
}

/// Lifecycle state of one agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Agent spawned, web service not yet announced
    NotStarted,
    /// Control API address captured; polling for tunnels
    WebServiceReady,
    /// Tunnel list reported; detection is done, streaming continues
    TunnelFound,
}

/// Supervises one run of the tunneling agent.
pub struct TunnelSession<C> {
    client: C,
    detector: Box<dyn ReadinessDetector>,
    state: SessionState,
    endpoint: Option<String>,
}

impl<C: ControlApi> TunnelSession<C> {
    /// Create a session using the stock ngrok log-format detector.
    pub fn new(client: C) -> Self {
        Self::with_detector(client, Box::new(NgrokLogDetector))
    }

    /// Create a session with a non-default detector (alternate agent
    /// versions with a different log format).
    pub fn with_detector(client: C, detector: Box<dyn ReadinessDetector>) -> Self {
        Self {
            client,
            detector,
            state: SessionState::NotStarted,
            endpoint: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The discovered control API base URL, once readiness was detected
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Start the agent and supervise it until it exits.
    ///
    /// Blocks (asynchronously) for the lifetime of the subprocess and
    /// returns its exit code, which is the authoritative outcome of the
    /// whole run.
    pub async fn run(
        mut self,
        invocation: &ProcessInvocation,
        sink: &mut dyn StatusSink,
    ) -> Result<i32, NgupError> {
        emit_banner(invocation, sink);

        debug!(
            "spawning {} {:?}",
            invocation.program(),
            invocation.args()
        );

        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("agent stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("agent stderr not captured"))?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;

        // Single reader of both pipes, single writer of session state.
        // Draining until EOF on both also flushes any residual stderr the
        // agent wrote right before exiting.
        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_lines.next_line(), if stdout_open => match line? {
                    Some(line) => self.observe_stdout(&line, sink).await,
                    None => stdout_open = false,
                },
                line = stderr_lines.next_line(), if stderr_open => match line? {
                    Some(line) => self.observe_stderr(&line, sink).await,
                    None => stderr_open = false,
                },
            }
        }

        let status = child.wait().await?;
        let code = exit_code(status);
        info!("agent exited with code {}", code);
        Ok(code)
    }

    /// Inspect one line of agent stdout and advance the state machine.
    ///
    /// Non-matching lines are not errors; they simply cause no transition.
    pub async fn observe_stdout(&mut self, line: &str, sink: &mut dyn StatusSink) {
        match self.state {
            SessionState::NotStarted => {
                if let Some(addr) = self.detector.control_addr(line) {
                    let url = format!("http://{}", addr);
                    info!("agent web service ready at {}", url);
                    self.client.set_endpoint(url.clone());
                    self.endpoint = Some(url.clone());
                    self.state = SessionState::WebServiceReady;
                    sink.line(&format!("Web Interface: {}", url));
                    sink.line("");
                }
            }
            SessionState::WebServiceReady => self.poll_tunnels(sink).await,
            SessionState::TunnelFound => {}
        }
    }

    /// Surface one line of agent stderr. Stderr is never parsed for state
    /// transitions, but it does count as an output chunk for polling.
    pub async fn observe_stderr(&mut self, line: &str, sink: &mut dyn StatusSink) {
        sink.error(line);
        if self.state == SessionState::WebServiceReady {
            self.poll_tunnels(sink).await;
        }
    }

    async fn poll_tunnels(&mut self, sink: &mut dyn StatusSink) {
        let tunnels = self.client.tunnels().await;
        if tunnels.is_empty() {
            // Not bound yet, or a transient poll failure; try again on the
            // next output chunk.
            return;
        }

        self.state = SessionState::TunnelFound;
        for tunnel in &tunnels {
            sink.line(&format!(
                "Forwarding: {} -> {}",
                tunnel.public_url, tunnel.addr
            ));
        }
    }
}

/// Banner and share-target header, emitted before the agent starts.
fn emit_banner(invocation: &ProcessInvocation, sink: &mut dyn StatusSink) {
    sink.line("-----------------");
    sink.line("|     NGROK     |");
    sink.line("-----------------");
    sink.line("");
    sink.line(&format!("Host: {}", invocation.host()));
    sink.line(&format!("Port: {}", invocation.port()));
    sink.line("");
}

/// Map the child's exit status to the code this command should exit with.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            // Shell convention for signal deaths
            return 128 + signal;
        }
    }
    status.code().unwrap_or(1)
}
