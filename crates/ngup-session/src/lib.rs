//! ngup-session: Agent process supervision and tunnel discovery
//!
//! One `TunnelSession` supervises one run of the tunneling agent: it spawns
//! the subprocess, streams its output, detects when the agent's local web
//! service is up, and polls the control API until the public tunnel
//! mapping appears.

pub mod api;
pub mod detect;
pub mod invocation;
pub mod session;

pub use api::{ControlApi, TunnelInfo, WebServiceClient};
pub use detect::{NgrokLogDetector, ReadinessDetector};
pub use invocation::ProcessInvocation;
pub use session::{SessionState, StatusSink, TunnelSession};
