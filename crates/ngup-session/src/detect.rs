//! Readiness detection from agent log output
//!
//! In `--log stdout` mode the agent announces its local web service with a
//! line like:
//!
//! ```text
//! t=2024-01-15T10:00:00+0000 lvl=info msg="starting web service" obj=web addr=127.0.0.1:4040
//! ```
//!
//! The log format belongs to the agent, not to us, so scraping is isolated
//! behind a small trait with one implementation per known format.

/// Extracts the control API address from agent log output.
pub trait ReadinessDetector: Send {
    /// The control API address announced on this line, if any.
    fn control_addr(&self, line: &str) -> Option<String>;
}

const WEB_SERVICE_MARKER: &str = "msg=\"starting web service\"";

/// Detector for the ngrok text log format (`--log stdout`).
pub struct NgrokLogDetector;

impl ReadinessDetector for NgrokLogDetector {
    fn control_addr(&self, line: &str) -> Option<String> {
        // The addr token must follow the marker on the same line.
        let (_, rest) = line.split_once(WEB_SERVICE_MARKER)?;
        rest.split_whitespace()
            .find_map(|token| token.strip_prefix("addr="))
            .filter(|addr| !addr.is_empty())
            .map(str::to_string)
    }
}
