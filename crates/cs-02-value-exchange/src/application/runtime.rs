//! Mutable per-input runtime state, kept outside the registry.

use crate::application::manager::InputCallback;
use shared_types::Time;
use std::fmt;

pub(crate) struct InputData {
    pub last_data: Option<Vec<u8>>,
    pub last_update: Time,
    pub last_query: Time,
    /// New data arrived from the Core and has not been read.
    pub has_update: bool,
    pub callback: Option<InputCallback>,
}

impl Default for InputData {
    fn default() -> Self {
        Self {
            last_data: None,
            last_update: Time::MIN,
            last_query: Time::MIN,
            has_update: false,
            callback: None,
        }
    }
}

impl fmt::Debug for InputData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputData")
            .field("bytes", &self.last_data.as_ref().map(Vec::len))
            .field("last_update", &self.last_update)
            .field("last_query", &self.last_query)
            .field("has_update", &self.has_update)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
