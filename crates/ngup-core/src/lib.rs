//! ngup-core: Shared types, errors, and configuration for ngup
//!
//! This crate provides the error taxonomy and configuration structures
//! used by the session and CLI crates.

pub mod config;
pub mod error;

pub use config::ShareConfig;
pub use error::{ConfigError, NgupError};
