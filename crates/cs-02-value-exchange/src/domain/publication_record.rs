//! Registry-owned state of one publication.

use shared_types::{DataType, FederateError, InterfaceHandle, Value};

#[derive(Debug, Clone)]
pub struct PublicationRecord {
    pub handle: InterfaceHandle,
    pub name: String,
    pub type_name: String,
    pub data_type: DataType,
    pub units: String,
    pub delta: f64,
    pub change_detection: bool,
    pub last_published: Option<Value>,
}

impl PublicationRecord {
    pub fn new(handle: InterfaceHandle, name: &str, type_name: &str, units: &str) -> Self {
        Self {
            handle,
            name: name.to_string(),
            type_name: type_name.to_string(),
            data_type: DataType::from_name(type_name),
            units: units.to_string(),
            delta: -1.0,
            change_detection: false,
            last_published: None,
        }
    }

    /// Same sign-transition rule as inputs.
    pub fn set_minimum_change(&mut self, delta: f64) {
        if self.delta < 0.0 {
            self.change_detection = true;
        }
        self.delta = delta;
        if self.delta < 0.0 {
            self.change_detection = false;
        }
    }

    pub fn enable_change_detection(&mut self, enabled: bool) {
        self.change_detection = enabled;
    }

    /// Convert a value to the publication's type and decide whether it
    /// goes out. `Ok(None)` means change detection suppressed it.
    ///
    /// Nothing is recorded here; call [`commit`](Self::commit) once the
    /// value has actually been sent.
    pub fn prepare(&self, value: Value) -> Result<Option<Value>, FederateError> {
        let value = value.convert_to(self.data_type)?;
        if self.change_detection {
            if let Some(previous) = &self.last_published {
                if !value.differs_by(previous, self.delta) {
                    return Ok(None);
                }
            }
        }
        Ok(Some(value))
    }

    /// Record a sent value as the reference for change detection.
    pub fn commit(&mut self, value: Value) {
        self.last_published = Some(value);
    }
}
