//! ngup-cli: Command-line interface for ngup
//!
//! Provides the `ngup` binary for sharing a local application
//! through an ngrok tunnel.

pub mod output;
