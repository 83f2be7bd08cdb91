//! # Value Codec
//!
//! Values cross the Core as opaque bytes. `Binary` uses bincode and is the
//! default; `Json` serialises through serde_json and is selected when a
//! federate registers every interface with the `json` type.

use crate::errors::FederateError;
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Byte encoding used for published values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueEncoding {
    #[default]
    Binary,
    Json,
}

impl ValueEncoding {
    /// Encode any serde type.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, FederateError> {
        match self {
            Self::Binary => {
                bincode::serialize(value).map_err(|e| FederateError::Encode(e.to_string()))
            }
            Self::Json => {
                serde_json::to_vec(value).map_err(|e| FederateError::Encode(e.to_string()))
            }
        }
    }

    /// Decode any serde type.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, FederateError> {
        match self {
            Self::Binary => {
                bincode::deserialize(bytes).map_err(|e| FederateError::Decode(e.to_string()))
            }
            Self::Json => {
                serde_json::from_slice(bytes).map_err(|e| FederateError::Decode(e.to_string()))
            }
        }
    }

    pub fn encode_value(self, value: &Value) -> Result<Vec<u8>, FederateError> {
        self.encode(value)
    }

    pub fn decode_value(self, bytes: &[u8]) -> Result<Value, FederateError> {
        if bytes.is_empty() {
            return Err(FederateError::Decode("empty buffer".to_string()));
        }
        self.decode(bytes)
    }

    /// The type name interfaces register with when this encoding forces one.
    pub const fn forced_type_name(self) -> Option<&'static str> {
        match self {
            Self::Binary => None,
            Self::Json => Some("json"),
        }
    }
}
