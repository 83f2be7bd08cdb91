//! Shared test setup.
//!
//! Every integration flow installs the process-wide subscriber through
//! [`init_test_logging`], so `CS_LOG_LEVEL=debug cargo test -p cs-tests`
//! shows component events alongside failures.

use cs_telemetry::{init_logging, TelemetryConfig, TelemetryError};
use std::env;
use std::sync::OnceLock;

/// Filter used when neither `CS_LOG_LEVEL` nor `RUST_LOG` is set.
const DEFAULT_TEST_LEVEL: &str = "warn";

static LOGGING: OnceLock<Result<(), TelemetryError>> = OnceLock::new();

/// Telemetry settings for the test process.
pub fn test_telemetry_config() -> TelemetryConfig {
    TelemetryConfig::from_lookup(|key| match key {
        "CS_SERVICE_NAME" => Some("cs-tests".to_string()),
        "CS_LOG_LEVEL" => env::var(key)
            .or_else(|_| env::var("RUST_LOG"))
            .ok()
            .or_else(|| Some(DEFAULT_TEST_LEVEL.to_string())),
        _ => env::var(key).ok(),
    })
}

/// Install the test subscriber once per process.
///
/// Returns the outcome of the first installation; a subscriber installed
/// by someone else first shows up as [`TelemetryError::AlreadyInitialized`]
/// and is accepted.
pub fn init_test_logging() -> &'static Result<(), TelemetryError> {
    LOGGING.get_or_init(|| init_logging(&test_telemetry_config()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_installs_once() {
        let first = init_test_logging();
        let second = init_test_logging();
        assert!(std::ptr::eq(first, second));
        assert!(!matches!(first, Err(TelemetryError::InvalidFilter { .. })));
    }

    #[test]
    fn test_config_names_the_suite() {
        let config = test_telemetry_config();
        assert_eq!(config.service_name, "cs-tests");
        assert!(!config.log_level.is_empty());
    }
}
