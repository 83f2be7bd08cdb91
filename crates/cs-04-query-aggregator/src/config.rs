//! Configuration for the fan-out query aggregator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout policy for in-flight fan-out queries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Time a query may wait for sub-answers before it is completed with
    /// whatever arrived (milliseconds).
    pub pending_timeout_ms: u64,
    /// Period of the background cleanup task (milliseconds).
    pub cleanup_interval_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            pending_timeout_ms: 30_000,
            cleanup_interval_ms: 1_000,
        }
    }
}

impl AggregatorConfig {
    pub fn pending_timeout(&self) -> Duration {
        Duration::from_millis(self.pending_timeout_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms.max(1))
    }
}
