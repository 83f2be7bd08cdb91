//! Time-stamped message exchanged between endpoints.

use serde::{Deserialize, Serialize};
use shared_types::Time;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Delivery time.
    pub time: Time,
    /// Endpoint that last forwarded the message.
    pub source: String,
    /// Endpoint that created the message; breaks ties between equal times.
    pub original_source: String,
    /// Endpoint whose queue receives the message.
    pub destination: String,
    /// Opaque message body.
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        time: Time,
    ) -> Self {
        let source = source.into();
        Self {
            time,
            original_source: source.clone(),
            source,
            destination: destination.into(),
            payload: payload.into(),
        }
    }

    pub fn with_original_source(mut self, original_source: impl Into<String>) -> Self {
        self.original_source = original_source.into();
        self
    }

    /// Payload as text, replacing invalid UTF-8.
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
