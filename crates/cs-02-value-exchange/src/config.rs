//! Value federate configuration.

use crate::domain::multi_input::MultiInputMode;
use serde::{Deserialize, Serialize};
use shared_types::ValueEncoding;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueFederateConfig {
    /// Wire encoding of published values. `Json` also registers every
    /// interface with the `json` type.
    pub encoding: ValueEncoding,
    /// Combination mode given to newly registered inputs.
    pub default_multi_input_mode: MultiInputMode,
    /// Log duplicate target additions at `warn` rather than `debug`.
    pub warn_on_duplicate_targets: bool,
}

impl Default for ValueFederateConfig {
    fn default() -> Self {
        Self {
            encoding: ValueEncoding::Binary,
            default_multi_input_mode: MultiInputMode::NoOp,
            warn_on_duplicate_targets: true,
        }
    }
}

impl ValueFederateConfig {
    pub fn json() -> Self {
        Self {
            encoding: ValueEncoding::Json,
            ..Self::default()
        }
    }
}
