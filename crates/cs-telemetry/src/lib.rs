//! # Co-Simulation Telemetry
//!
//! Installs the process-wide `tracing` subscriber used by every component
//! crate. Components only emit events; this crate decides where they go.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cs_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config).expect("logging already initialised");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CS_JSON_LOGS` | `false` | JSON formatted output |
//! | `CS_CONSOLE_OUTPUT` | `true` | Write events to stdout |
//! | `CS_SERVICE_NAME` | `co-simulation` | Service name attached to the startup event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialisation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Logging already initialised")]
    AlreadyInitialized,

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
}
