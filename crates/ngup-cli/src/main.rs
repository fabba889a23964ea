//! ngup CLI
//!
//! Shares a local HTTP application through an ngrok tunnel: spawns the
//! agent, waits for its web service to come up, and reports the public
//! forwarding URLs as they appear.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use ngup::output::{print_error, ConsoleSink};
use ngup_core::config::{self, ShareConfig};
use ngup_session::{ProcessInvocation, TunnelSession, WebServiceClient};

#[derive(Parser)]
#[command(name = "ngup")]
#[command(author, version, about = "Share a local application through an ngrok tunnel")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Host to share (defaults to the host of `app_url` from the config file)
    host: Option<String>,

    /// Port to share (defaults to the port of `app_url`, else 80)
    #[arg(short, long)]
    port: Option<String>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(command) = cli.command {
        match command {
            Commands::Config { action } => match action {
                ConfigAction::Show => {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
                ConfigAction::Path => {
                    let path = cli
                        .config
                        .unwrap_or_else(config::default_config_path);
                    println!("{}", path.display());
                }
            },
        }
        return Ok(());
    }

    let (host, port) = resolve_target(cli.host, cli.port, &config);
    tracing::debug!("share target resolved to {:?}:{:?}", host, port);

    let invocation = match ProcessInvocation::build(&host, &port) {
        Ok(invocation) => match config.ngrok_path {
            Some(ref path) => invocation.with_program(path),
            None => invocation,
        },
        Err(e) => {
            // No subprocess is started from a bad share target.
            print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let client = WebServiceClient::new().context("Failed to create control API client")?;
    let session = TunnelSession::new(client);
    let mut sink = ConsoleSink;

    let code = session.run(&invocation, &mut sink).await?;

    // The agent's exit code is the authoritative outcome of this command.
    std::process::exit(code);
}

/// Resolve the share target from CLI arguments, falling back to the
/// configured application URL for whichever part is missing.
fn resolve_target(
    host: Option<String>,
    port: Option<String>,
    config: &ShareConfig,
) -> (String, String) {
    let mut host = host.unwrap_or_default();
    let mut port = port.unwrap_or_default();

    if host.is_empty() {
        if let Some(url) = config
            .app_url
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok())
        {
            if let Some(h) = url.host_str() {
                host = h.to_string();
            }
            if port.is_empty() {
                if let Some(p) = url.port() {
                    port = p.to_string();
                }
            }
        }
    }

    (host, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(app_url: &str) -> ShareConfig {
        ShareConfig {
            app_url: Some(app_url.to_string()),
            ngrok_path: None,
        }
    }

    #[test]
    fn test_resolve_target_explicit_args_win() {
        let config = config_with_url("http://configured.test:9000");
        let (host, port) = resolve_target(
            Some("example.com".to_string()),
            Some("8080".to_string()),
            &config,
        );
        assert_eq!(host, "example.com");
        assert_eq!(port, "8080");
    }

    #[test]
    fn test_resolve_target_falls_back_to_app_url() {
        let config = config_with_url("http://configured.test:9000");
        let (host, port) = resolve_target(None, None, &config);
        assert_eq!(host, "configured.test");
        assert_eq!(port, "9000");
    }

    #[test]
    fn test_resolve_target_app_url_without_port() {
        let config = config_with_url("http://configured.test");
        let (host, port) = resolve_target(None, None, &config);
        assert_eq!(host, "configured.test");
        // Left empty; the invocation builder applies the "80" default.
        assert_eq!(port, "");
    }

    #[test]
    fn test_resolve_target_explicit_port_kept_with_config_host() {
        let config = config_with_url("http://configured.test:9000");
        let (host, port) = resolve_target(None, Some("3000".to_string()), &config);
        assert_eq!(host, "configured.test");
        assert_eq!(port, "3000");
    }

    #[test]
    fn test_resolve_target_nothing_configured() {
        let config = ShareConfig::default();
        let (host, port) = resolve_target(None, None, &config);
        assert!(host.is_empty());
        assert!(port.is_empty());
    }

    #[test]
    fn test_resolve_target_unparseable_app_url() {
        let config = config_with_url("not a url at all");
        let (host, _) = resolve_target(None, None, &config);
        assert!(host.is_empty());
    }
}
