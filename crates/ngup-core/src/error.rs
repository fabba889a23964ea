//! Core error types for ngup

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the ngup crates
#[derive(Error, Debug)]
pub enum NgupError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction error
    ///
    /// Poll failures against the control API are absorbed, never surfaced;
    /// this variant only covers failing to build the client at all.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The share target host is empty or missing
    #[error("Invalid host")]
    InvalidHost,

    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
