//! Control-API client for the agent's local administrative endpoint
//!
//! The agent exposes a small HTTP API next to the tunnel it creates;
//! `GET /api/tunnels` lists the active tunnels. While the agent is still
//! starting up the API is simply unreachable, so every failure mode here
//! collapses into "no tunnels yet" and the session keeps polling.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use ngup_core::NgupError;

/// One active tunnel as reported by the control API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelInfo {
    /// Public URL the agent allocated
    pub public_url: String,
    /// Local address the tunnel forwards to
    pub addr: String,
}

/// Response shape of `GET /api/tunnels`; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct TunnelsResponse {
    #[serde(default)]
    tunnels: Vec<TunnelEntry>,
}

#[derive(Debug, Deserialize)]
struct TunnelEntry {
    public_url: String,
    config: TunnelEntryConfig,
}

#[derive(Debug, Deserialize)]
struct TunnelEntryConfig {
    addr: String,
}

/// Source of the current tunnel list, polled by the session after the
/// agent's web service comes up.
#[async_trait]
pub trait ControlApi: Send {
    /// Record the base URL of the agent's control API.
    fn set_endpoint(&mut self, url: String);

    /// Fetch the current tunnel list. "Not ready yet" in any form (endpoint
    /// unset, connection refused, timeout, non-2xx, malformed body) is an
    /// empty list, never an error. No internal retry; the caller's repeated
    /// polling is the retry mechanism.
    async fn tunnels(&self) -> Vec<TunnelInfo>;
}

/// Per-request timeout; a stalled control API must not hold up output
/// draining for longer than this.
const POLL_TIMEOUT: Duration = Duration::from_secs(2);

/// reqwest-backed client for the agent's control API.
pub struct WebServiceClient {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl WebServiceClient {
    /// Create a client; fails only if the underlying HTTP client cannot
    /// be constructed.
    pub fn new() -> Result<Self, NgupError> {
        let http = reqwest::Client::builder().timeout(POLL_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: None,
        })
    }

    /// The recorded control API base URL, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

#[async_trait]
impl ControlApi for WebServiceClient {
    fn set_endpoint(&mut self, url: String) {
        self.endpoint = Some(url);
    }

    async fn tunnels(&self) -> Vec<TunnelInfo> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Vec::new();
        };

        let url = format!("{}/api/tunnels", endpoint);
        let response = match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(status = %response.status(), "control API returned non-success");
                return Vec::new();
            }
            Err(e) => {
                // Expected while the agent's API server is still coming up.
                debug!("control API not reachable yet: {}", e);
                return Vec::new();
            }
        };

        match response.json::<TunnelsResponse>().await {
            Ok(body) => body
                .tunnels
                .into_iter()
                .map(|entry| TunnelInfo {
                    public_url: entry.public_url,
                    addr: entry.config.addr,
                })
                .collect(),
            Err(e) => {
                debug!("control API response not parseable: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tunnel_list() {
        let body = r#"{
            "tunnels": [
                {
                    "name": "command_line",
                    "public_url": "https://abc.ngrok.io",
                    "proto": "https",
                    "config": {"addr": "http://localhost:8080", "inspect": true},
                    "metrics": {}
                },
                {
                    "public_url": "http://abc.ngrok.io",
                    "config": {"addr": "http://localhost:8080"}
                }
            ],
            "uri": "/api/tunnels"
        }"#;

        let parsed: TunnelsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.tunnels.len(), 2);
        assert_eq!(parsed.tunnels[0].public_url, "https://abc.ngrok.io");
        assert_eq!(parsed.tunnels[0].config.addr, "http://localhost:8080");
    }

    #[test]
    fn test_parse_missing_tunnels_key() {
        let parsed: TunnelsResponse = serde_json::from_str(r#"{"uri": "/api/tunnels"}"#).unwrap();
        assert!(parsed.tunnels.is_empty());
    }

    #[tokio::test]
    async fn test_tunnels_without_endpoint() {
        let client = WebServiceClient::new().unwrap();
        assert!(client.endpoint().is_none());
        assert!(client.tunnels().await.is_empty());
    }

    #[tokio::test]
    async fn test_tunnels_unreachable_endpoint() {
        // Nothing listens here; the failure must come back as an empty list.
        let mut client = WebServiceClient::new().unwrap();
        client.set_endpoint("http://127.0.0.1:1".to_string());
        assert!(client.tunnels().await.is_empty());
    }
}
