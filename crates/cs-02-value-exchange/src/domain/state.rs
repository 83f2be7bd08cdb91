//! Federate lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FederateState {
    #[default]
    Startup,
    Initializing,
    Executing,
    Finalized,
}

impl FederateState {
    /// Forward-only: `Startup -> Initializing -> Executing`, and any live
    /// state may finalize.
    pub fn can_transition_to(self, next: FederateState) -> bool {
        matches!(
            (self, next),
            (Self::Startup, Self::Initializing)
                | (Self::Initializing, Self::Executing)
                | (Self::Startup | Self::Initializing | Self::Executing, Self::Finalized)
        )
    }
}

impl fmt::Display for FederateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Startup => "startup",
            Self::Initializing => "initializing",
            Self::Executing => "executing",
            Self::Finalized => "finalized",
        };
        f.write_str(name)
    }
}
