//! # Input Record
//!
//! Registry-owned state of one input: declared and resolved types, cached
//! value, change-detection threshold, and the application-visible update
//! flag. Raw bytes and callbacks live separately in the runtime arena,
//! reached through `data_index`.
//!
//! ## Change Detection
//!
//! `delta < 0` disables detection. Setting a non-negative delta after a
//! negative one re-enables it, and vice versa; the flag follows the sign
//! transition rather than being stored independently.

use crate::domain::multi_input::MultiInputMode;
use crate::ports::outbound::UnitConverter;
use cs_01_interface_registry::ArenaIndex;
use shared_types::{DataType, FederateError, InterfaceHandle, Value, ValueEncoding};

/// Raw data fetched from the Core for one update.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Latest value of the most recent source.
    Single(Vec<u8>),
    /// Current value of every source, in source order.
    Multiple(Vec<Vec<u8>>),
}

#[derive(Debug, Clone)]
pub struct InputRecord {
    pub handle: InterfaceHandle,
    pub name: String,
    pub type_name: String,
    pub declared_type: DataType,
    pub units: String,
    pub injection_type: DataType,
    pub injection_units: String,
    pub last_value: Value,
    pub delta: f64,
    pub change_detection: bool,
    /// A qualifying update the application has not yet read.
    pub updated: bool,
    pub multi_input_mode: MultiInputMode,
    pub data_index: ArenaIndex,
    pub source_resolved: bool,
}

impl InputRecord {
    pub fn new(
        handle: InterfaceHandle,
        name: &str,
        type_name: &str,
        units: &str,
        data_index: ArenaIndex,
        multi_input_mode: MultiInputMode,
    ) -> Self {
        let declared_type = DataType::from_name(type_name);
        Self {
            handle,
            name: name.to_string(),
            type_name: type_name.to_string(),
            declared_type,
            units: units.to_string(),
            injection_type: DataType::Unknown,
            injection_units: String::new(),
            last_value: Value::default_for(declared_type),
            delta: -1.0,
            change_detection: false,
            updated: false,
            multi_input_mode,
            data_index,
            source_resolved: false,
        }
    }

    /// Type values are held in: the declared type if it is concrete,
    /// otherwise whatever the source sends.
    pub fn target_type(&self) -> DataType {
        if self.declared_type.is_primary() {
            self.declared_type
        } else {
            self.injection_type
        }
    }

    /// Record the source's type and units. An empty type means the source
    /// is not known yet and resolution is retried later.
    pub fn resolve_source(&mut self, type_name: &str, units: &str) {
        if type_name.is_empty() {
            return;
        }
        self.injection_type = DataType::from_name(type_name);
        self.injection_units = units.to_string();
        self.source_resolved = true;
        if self.declared_type.is_unresolved() && !self.updated {
            if let Ok(v) = self.last_value.convert_to(self.injection_type) {
                self.last_value = v;
            }
        }
    }

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

    /// Establish the value read before any update; bypasses change
    /// detection and leaves the update flag alone.
    pub fn set_default(&mut self, value: Value) {
        self.last_value = value;
    }

    /// Decode one encoded value into the record's target type, converting
    /// units when the source's differ from ours.
    pub fn decode(
        &self,
        bytes: &[u8],
        encoding: ValueEncoding,
        units: &dyn UnitConverter,
    ) -> Result<Value, FederateError> {
        self.decode_native(bytes, encoding, units)?
            .convert_to(self.target_type())
    }

    /// Decode one encoded value in the source's own type, with units scaled.
    fn decode_native(
        &self,
        bytes: &[u8],
        encoding: ValueEncoding,
        units: &dyn UnitConverter,
    ) -> Result<Value, FederateError> {
        let raw = encoding.decode_value(bytes)?;
        Ok(self.convert_units(raw, units))
    }

    fn convert_units(&self, value: Value, units: &dyn UnitConverter) -> Value {
        let (from, to) = (self.injection_units.as_str(), self.units.as_str());
        if from.is_empty() || to.is_empty() || from == to {
            return value;
        }
        match value {
            Value::Double(x) => Value::Double(units.convert(x, from, to).unwrap_or(x)),
            Value::Vector(v) => Value::Vector(
                v.into_iter()
                    .map(|x| units.convert(x, from, to).unwrap_or(x))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Reduce fetched data to one value. Sources that fail to decode are
    /// skipped; if none decode, the first error is returned.
    ///
    /// Source values are combined in their own types and the result is
    /// converted to the target type once.
    pub fn resolve_incoming(
        &self,
        incoming: &Incoming,
        encoding: ValueEncoding,
        units: &dyn UnitConverter,
    ) -> Result<Value, FederateError> {
        match incoming {
            Incoming::Single(bytes) => self.decode(bytes, encoding, units),
            Incoming::Multiple(all) => {
                let mut first_error = None;
                let values: Vec<Value> = all
                    .iter()
                    .filter_map(|bytes| match self.decode_native(bytes, encoding, units) {
                        Ok(v) => Some(v),
                        Err(e) => {
                            if first_error.is_none() {
                                first_error = Some(e);
                            }
                            None
                        }
                    })
                    .collect();
                match self.multi_input_mode.combine(&values) {
                    Some(combined) => combined.convert_to(self.target_type()),
                    None => Err(first_error.unwrap_or_else(|| {
                        FederateError::Decode("no source values to combine".to_string())
                    })),
                }
            }
        }
    }

    /// Offer a newly decoded value.
    ///
    /// Returns whether it qualifies as an update: always when change
    /// detection is off, otherwise only when it is at least `delta` away
    /// from the cached value. A qualifying value replaces the cache and sets
    /// `updated`; a rejected one leaves both untouched.
    pub fn apply_update(&mut self, value: Value) -> bool {
        if self.change_detection && !value.differs_by(&self.last_value, self.delta) {
            return false;
        }
        self.last_value = value;
        self.updated = true;
        true
    }

    /// Inputs whose values are opaque to the manager (custom types).
    pub fn is_raw(&self) -> bool {
        self.target_type() == DataType::Raw
    }

    /// Resolve fetched data and offer it as an update.
    ///
    /// Raw inputs count any arrival as an update even when the bytes do not
    /// decode to a [`Value`]; the cached value is then left unchanged.
    pub fn ingest(
        &mut self,
        incoming: &Incoming,
        encoding: ValueEncoding,
        units: &dyn UnitConverter,
    ) -> Result<bool, FederateError> {
        match self.resolve_incoming(incoming, encoding, units) {
            Ok(value) => Ok(self.apply_update(value)),
            Err(_) if self.is_raw() => {
                self.updated = true;
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }

    /// Name shown in queries: the key, or the first target for anonymous
    /// inputs.
    pub fn display_name<'a>(&'a self, first_target: Option<&'a str>) -> &'a str {
        if self.name.is_empty() {
            first_target.unwrap_or("")
        } else {
            &self.name
        }
    }
}
