//! Configuration for endpoint queues.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Bound on messages held per endpoint. When full, new deliveries are
    /// dropped with a warning. `None` means unbounded.
    pub max_queue_depth: Option<usize>,
}

impl EndpointConfig {
    pub fn bounded(depth: usize) -> Self {
        Self {
            max_queue_depth: Some(depth),
        }
    }

    /// Whether a queue holding `len` messages can accept another.
    pub fn accepts(&self, len: usize) -> bool {
        self.max_queue_depth.map_or(true, |max| len < max)
    }
}
