//! Agent command-line construction

use ngup_core::ConfigError;

/// Default forwarded port when the operator gives none.
const DEFAULT_PORT: &str = "80";

/// Agent binary, looked up on PATH unless overridden.
const DEFAULT_PROGRAM: &str = "ngrok";

/// Executable command specification for one agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    program: String,
    args: Vec<String>,
    host: String,
    port: String,
}

impl ProcessInvocation {
    /// Build the agent invocation forwarding HTTP traffic to `host:port`.
    ///
    /// An empty port defaults to `"80"`. An empty host is a contract
    /// violation by the caller and fails with [`ConfigError::InvalidHost`];
    /// no subprocess is ever started from it.
    pub fn build(host: &str, port: &str) -> Result<Self, ConfigError> {
        if host.is_empty() {
            return Err(ConfigError::InvalidHost);
        }
        let port = if port.is_empty() { DEFAULT_PORT } else { port };

        // `--log stdout` switches the agent to line-oriented logging on
        // stdout; readiness detection depends on it. `--host-header` makes
        // virtual-host applications see the expected Host header.
        let args = vec![
            "http".to_string(),
            "--log".to_string(),
            "stdout".to_string(),
            "--host-header".to_string(),
            host.to_string(),
            format!("{}:{}", host, port),
        ];

        Ok(Self {
            program: DEFAULT_PROGRAM.to_string(),
            args,
            host: host.to_string(),
            port: port.to_string(),
        })
    }

    /// Override the agent binary, e.g. with `ngrok_path` from the config file.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Program name or path to execute
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Ordered argument list
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Host being shared
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Effective port being shared
    pub fn port(&self) -> &str {
        &self.port
    }
}
