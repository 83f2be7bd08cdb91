//! # Error Types
//!
//! Error taxonomy shared by the interface registry, the value exchange
//! manager and the interface objects.

use crate::data_type::DataType;
use thiserror::Error;

/// Errors raised to the caller performing a registration, lookup or
/// value access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FederateError {
    /// Name collision in the registry, or the Core rejected the registration.
    #[error("Registration failure: {0}")]
    RegistrationFailure(String),

    /// Operation on an unregistered or invalid handle/name.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A value could not be represented in the requested type.
    #[error("Cannot convert {from} value to {to}")]
    InvalidConversion { from: DataType, to: DataType },

    /// Raw bytes could not be decoded.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// A value could not be encoded.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// The call is not allowed in the current lifecycle state.
    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    /// The owning manager is gone; the interface no longer produces updates.
    #[error("Federate disconnected")]
    Disconnected,
}

impl FederateError {
    /// True for errors that indicate a bad identifier rather than bad data.
    pub fn is_identifier_error(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_) | Self::Disconnected)
    }
}
