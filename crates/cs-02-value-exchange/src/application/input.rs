//! # Input Handle
//!
//! Application-facing view of one registered input. The handle holds a weak
//! reference to its manager; once the manager is dropped every operation
//! returns [`FederateError::Disconnected`].

use crate::application::manager::{InputCallback, ManagerShared};
use crate::domain::input_record::{Incoming, InputRecord};
use crate::domain::multi_input::MultiInputMode;
use crate::domain::value_type::FromValue;
use serde::de::DeserializeOwned;
use shared_types::{DataType, FederateError, InterfaceHandle, Time, Value};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

#[derive(Clone, Default)]
pub struct Input {
    handle: InterfaceHandle,
    index: usize,
    name: String,
    manager: Weak<ManagerShared>,
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("handle", &self.handle)
            .field("index", &self.index)
            .field("name", &self.name)
            .field("connected", &(self.manager.strong_count() > 0))
            .finish()
    }
}

impl Input {
    pub(crate) fn new(
        handle: InterfaceHandle,
        index: usize,
        name: &str,
        manager: Weak<ManagerShared>,
    ) -> Self {
        Self {
            handle,
            index,
            name: name.to_string(),
            manager,
        }
    }

    fn manager(&self) -> Result<Arc<ManagerShared>, FederateError> {
        if !self.handle.is_valid() {
            return Err(FederateError::InvalidIdentifier(
                "input is not registered".to_string(),
            ));
        }
        self.manager.upgrade().ok_or(FederateError::Disconnected)
    }

    /// True once registration succeeded.
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    pub fn handle(&self) -> InterfaceHandle {
        self.handle
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Registered key; empty for anonymous subscriptions.
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // VALUES
    // =========================================================================

    /// Current value converted to `T`. Reading clears the update flag.
    pub fn get_value<T: FromValue>(&self) -> Result<T, FederateError> {
        let value = self.manager()?.read_value(self.index)?;
        T::from_value(&value)
    }

    /// Like [`Input::get_value`], writing into an existing slot.
    pub fn get_value_into<T: FromValue>(&self, out: &mut T) -> Result<(), FederateError> {
        *out = self.get_value()?;
        Ok(())
    }

    /// Deserialize the latest raw bytes as a custom type.
    pub fn get_custom<T: DeserializeOwned>(&self) -> Result<T, FederateError> {
        let manager = self.manager()?;
        let bytes = manager.read_raw(self.index)?;
        manager.config.encoding.decode(&bytes)
    }

    /// Latest bytes received, or the cached value encoded when nothing has
    /// arrived yet.
    pub fn get_raw(&self) -> Result<Vec<u8>, FederateError> {
        self.manager()?.read_raw(self.index)
    }

    /// Whether a qualifying update is waiting. With `assume_update` the
    /// last received data is run through change detection again.
    pub fn check_update(&self, assume_update: bool) -> Result<bool, FederateError> {
        self.manager()?.check_update(self.index, assume_update)
    }

    /// `false` for invalid or disconnected inputs.
    pub fn is_updated(&self) -> bool {
        self.manager()
            .and_then(|m| m.read_input(self.index, |rec| rec.updated))
            .unwrap_or(false)
    }

    /// New data has arrived from the Core, qualifying or not.
    pub fn has_update(&self) -> bool {
        self.manager()
            .and_then(|m| m.read_data(self.index, |data| data.has_update))
            .unwrap_or(false)
    }

    pub fn clear_update(&self) -> Result<(), FederateError> {
        self.manager()?.clear_input_update(self.index)
    }

    pub fn last_update_time(&self) -> Result<Time, FederateError> {
        self.manager()?
            .read_data(self.index, |data| data.last_update)
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Value returned before the first update. Stored as given.
    pub fn set_default(&self, value: impl Into<Value>) -> Result<(), FederateError> {
        let value = value.into();
        self.manager()?
            .modify_input(self.index, |rec| rec.set_default(value))
    }

    /// A negative `delta` disables change detection.
    pub fn set_minimum_change(&self, delta: f64) -> Result<(), FederateError> {
        self.manager()?
            .modify_input(self.index, |rec| rec.set_minimum_change(delta))
    }

    pub fn enable_change_detection(&self, enabled: bool) -> Result<(), FederateError> {
        self.manager()?
            .modify_input(self.index, |rec| rec.enable_change_detection(enabled))
    }

    pub fn set_multi_input_mode(&self, mode: MultiInputMode) -> Result<(), FederateError> {
        self.manager()?
            .modify_input(self.index, |rec| rec.multi_input_mode = mode)
    }

    pub fn add_target(&self, target: &str) -> Result<(), FederateError> {
        self.manager()?.add_input_target(self.handle, target)
    }

    pub fn remove_target(&self, target: &str) -> Result<(), FederateError> {
        self.manager()?.remove_input_target(self.handle, target);
        Ok(())
    }

    pub fn targets(&self) -> Result<Vec<String>, FederateError> {
        Ok(self.manager()?.targets_of(self.handle))
    }

    /// First target, or an empty string.
    pub fn target(&self) -> String {
        self.targets()
            .ok()
            .and_then(|t| t.into_iter().next())
            .unwrap_or_default()
    }

    pub fn add_alias(&self, alias: &str) -> Result<(), FederateError> {
        self.manager()?
            .add_input_alias(self.handle, &self.name, alias)
    }

    /// Invoked instead of the federate-wide callback when this input
    /// receives a qualifying update.
    pub fn set_callback(
        &self,
        callback: impl Fn(&Input, Time) + Send + Sync + 'static,
    ) -> Result<(), FederateError> {
        let callback: InputCallback = Arc::new(callback);
        self.manager()?.set_input_callback(self.index, callback)
    }

    /// Callback receiving the value already converted to `T`. Conversion
    /// failures are logged and the callback is skipped.
    pub fn set_value_callback<T: FromValue + 'static>(
        &self,
        callback: impl Fn(T, Time) + Send + Sync + 'static,
    ) -> Result<(), FederateError> {
        self.set_callback(move |input, time| match input.get_value::<T>() {
            Ok(value) => callback(value, time),
            Err(err) => debug!(input = input.name(), error = %err, "Typed callback skipped"),
        })
    }

    // =========================================================================
    // METADATA
    // =========================================================================

    /// Declared type, or the source's type once resolved for untyped inputs.
    pub fn data_type(&self) -> Result<DataType, FederateError> {
        self.manager()?.read_input(self.index, InputRecord::target_type)
    }

    pub fn type_name(&self) -> Result<String, FederateError> {
        self.manager()?
            .read_input(self.index, |rec| rec.type_name.clone())
    }

    pub fn units(&self) -> Result<String, FederateError> {
        self.manager()?.read_input(self.index, |rec| rec.units.clone())
    }

    pub fn injection_type(&self) -> Result<DataType, FederateError> {
        self.manager()?
            .read_input(self.index, |rec| rec.injection_type)
    }

    pub fn injection_units(&self) -> Result<String, FederateError> {
        self.manager()?
            .read_input(self.index, |rec| rec.injection_units.clone())
    }

    /// Key, or first target for anonymous inputs.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.target()
        } else {
            self.name.clone()
        }
    }
}

// =============================================================================
// MANAGER SIDE
// =============================================================================

impl ManagerShared {
    fn unknown_input(index: usize) -> FederateError {
        FederateError::InvalidIdentifier(format!("no input at index {index}"))
    }

    pub(super) fn read_input<R>(
        &self,
        index: usize,
        f: impl FnOnce(&InputRecord) -> R,
    ) -> Result<R, FederateError> {
        self.inputs
            .with_index(index, f)
            .ok_or_else(|| Self::unknown_input(index))
    }

    pub(super) fn modify_input<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut InputRecord) -> R,
    ) -> Result<R, FederateError> {
        self.inputs
            .modify_index(index, f)
            .ok_or_else(|| Self::unknown_input(index))
    }

    fn read_data<R>(
        &self,
        index: usize,
        f: impl FnOnce(&crate::application::runtime::InputData) -> R,
    ) -> Result<R, FederateError> {
        let data_index = self.read_input(index, |rec| rec.data_index)?;
        self.input_data
            .with(data_index, f)
            .ok_or_else(|| Self::unknown_input(index))
    }

    /// Take the cached value and mark it read.
    fn read_value(&self, index: usize) -> Result<Value, FederateError> {
        let (value, data_index) = self.modify_input(index, |rec| {
            rec.updated = false;
            (rec.last_value.clone(), rec.data_index)
        })?;
        let now = self.current_time();
        self.input_data.with_mut(data_index, |data| {
            data.has_update = false;
            data.last_query = now;
        });
        Ok(value)
    }

    fn read_raw(&self, index: usize) -> Result<Vec<u8>, FederateError> {
        let (value, data_index) = self.modify_input(index, |rec| {
            rec.updated = false;
            (rec.last_value.clone(), rec.data_index)
        })?;
        let now = self.current_time();
        let bytes = self
            .input_data
            .with_mut(data_index, |data| {
                data.has_update = false;
                data.last_query = now;
                data.last_data.clone()
            })
            .flatten();
        match bytes {
            Some(bytes) => Ok(bytes),
            None => self.config.encoding.encode_value(&value),
        }
    }

    pub(super) fn clear_input_update(&self, index: usize) -> Result<(), FederateError> {
        let data_index = self.modify_input(index, |rec| {
            rec.updated = false;
            rec.data_index
        })?;
        self.input_data
            .with_mut(data_index, |data| data.has_update = false);
        Ok(())
    }

    fn check_update(&self, index: usize, assume_update: bool) -> Result<bool, FederateError> {
        if !assume_update {
            return self.read_input(index, |rec| rec.updated);
        }
        let (handle, mode, data_index) =
            self.read_input(index, |rec| (rec.handle, rec.multi_input_mode, rec.data_index))?;
        let incoming = if mode == MultiInputMode::NoOp {
            match self
                .input_data
                .with(data_index, |data| data.last_data.clone())
                .flatten()
            {
                Some(bytes) => Incoming::Single(bytes),
                None => return self.read_input(index, |rec| rec.updated),
            }
        } else {
            Incoming::Multiple(self.core().get_all_values(handle))
        };

        let encoding = self.config.encoding;
        let units = self.units.as_ref();
        self.modify_input(index, |rec| {
            if let Err(err) = rec.ingest(&incoming, encoding, units) {
                debug!(%handle, error = %err, "Re-evaluation of last data failed");
            }
            rec.updated
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::adapters::in_memory_core::InMemoryCore;
    use crate::application::manager::ValueFederateManager;
    use crate::config::ValueFederateConfig;
    use serde::{Deserialize, Serialize};
    use shared_types::{Complex, FederateError, NamedPoint, Time, Value};
    use std::sync::Arc;

    fn manager() -> (Arc<InMemoryCore>, ValueFederateManager) {
        let core = Arc::new(InMemoryCore::new());
        let fed = core.register_federate("fed");
        let manager = ValueFederateManager::new(core.clone(), fed, ValueFederateConfig::default());
        (core, manager)
    }

    #[test]
    fn test_set_default_round_trips_every_scalar() {
        let (_core, m) = manager();
        let input = m.register_input("in", "", "").unwrap();

        input.set_default(2.5).unwrap();
        assert_eq!(input.get_value::<f64>().unwrap(), 2.5);
        input.set_default(-7_i64).unwrap();
        assert_eq!(input.get_value::<i64>().unwrap(), -7);
        input.set_default("text").unwrap();
        assert_eq!(input.get_value::<String>().unwrap(), "text");
        input.set_default(true).unwrap();
        assert!(input.get_value::<bool>().unwrap());
        input.set_default(Time::from_secs_f64(1.5)).unwrap();
        assert_eq!(input.get_value::<Time>().unwrap(), Time::from_secs_f64(1.5));
        input.set_default(Complex::new(1.0, -2.0)).unwrap();
        assert_eq!(input.get_value::<Complex>().unwrap(), Complex::new(1.0, -2.0));
        input.set_default(vec![1.0, 2.0]).unwrap();
        assert_eq!(input.get_value::<Vec<f64>>().unwrap(), vec![1.0, 2.0]);
        input.set_default(NamedPoint::new("p", 3.0)).unwrap();
        assert_eq!(input.get_value::<NamedPoint>().unwrap(), NamedPoint::new("p", 3.0));

        let phasors = vec![Complex::new(1.0, 2.0), Complex::new(-0.5, 0.0)];
        input.set_default(phasors.clone()).unwrap();
        assert_eq!(input.get_value::<Vec<Complex>>().unwrap(), phasors);
    }

    #[test]
    fn test_complex_vector_default_on_typed_input() {
        let (_core, m) = manager();
        let input = m.register_input("phasors", "complex_vector", "").unwrap();
        let phasors = vec![Complex::new(0.0, 1.0), Complex::new(3.0, -4.0)];
        input.set_default(phasors.clone()).unwrap();

        assert_eq!(input.get_value::<Vec<Complex>>().unwrap(), phasors);
        assert_eq!(input.get_value::<Complex>().unwrap(), Complex::new(0.0, 1.0));
        assert!(!input.is_updated());
    }

    #[test]
    fn test_typed_read_converts() {
        let (_core, m) = manager();
        let input = m.register_input("in", "double", "").unwrap();
        input.set_default(3.9).unwrap();
        assert_eq!(input.get_value::<i64>().unwrap(), 3);
        assert_eq!(input.get_value::<String>().unwrap(), "3.9");
        let mut slot = Value::default();
        input.get_value_into(&mut slot).unwrap();
        assert_eq!(slot, Value::Double(3.9));
    }

    #[test]
    fn test_custom_type_exchange() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Breaker {
            id: u32,
            closed: bool,
        }

        let (_core, m) = manager();
        let publication = m.register_publication("breaker", "breaker_state", "").unwrap();
        let input = m.register_input("watch", "breaker_state", "").unwrap();
        input.add_target("breaker").unwrap();

        publication
            .publish_custom(&Breaker { id: 4, closed: true })
            .unwrap();
        m.update_time(Time::from_secs_f64(1.0));

        assert!(input.is_updated());
        assert_eq!(
            input.get_custom::<Breaker>().unwrap(),
            Breaker { id: 4, closed: true }
        );
    }

    #[test]
    fn test_check_update_reevaluates_last_data() {
        let (_core, m) = manager();
        let publication = m.register_publication("pub", "double", "").unwrap();
        let input = m.register_input("in", "double", "").unwrap();
        input.add_target("pub").unwrap();

        publication.publish(1.0).unwrap();
        m.update_time(Time::from_secs_f64(1.0));
        assert!(input.check_update(false).unwrap());
        input.clear_update().unwrap();
        assert!(!input.check_update(false).unwrap());
        assert!(!input.has_update());

        assert!(input.check_update(true).unwrap());
        input.clear_update().unwrap();
        input.set_minimum_change(10.0).unwrap();
        assert!(!input.check_update(true).unwrap());
    }

    #[test]
    fn test_raw_read_before_and_after_data() {
        let (_core, m) = manager();
        let publication = m.register_publication("pub", "int64", "").unwrap();
        let input = m.register_input("in", "int64", "").unwrap();
        input.add_target("pub").unwrap();

        let encoding = m.config().encoding;
        assert_eq!(
            encoding.decode_value(&input.get_raw().unwrap()).unwrap(),
            Value::Int(0)
        );

        publication.publish(12_i64).unwrap();
        m.update_time(Time::from_secs_f64(1.0));
        assert_eq!(
            encoding.decode_value(&input.get_raw().unwrap()).unwrap(),
            Value::Int(12)
        );
    }

    #[test]
    fn test_value_callback_receives_converted_value() {
        let (_core, m) = manager();
        let publication = m.register_publication("pub", "double", "").unwrap();
        let input = m.register_input("in", "int64", "").unwrap();
        input.add_target("pub").unwrap();

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = seen.clone();
        input
            .set_value_callback::<i64>(move |v, t| log.lock().push((v, t)))
            .unwrap();

        publication.publish(8.2).unwrap();
        m.update_time(Time::from_secs_f64(2.0));
        assert_eq!(*seen.lock(), vec![(8, Time::from_secs_f64(2.0))]);
    }

    #[test]
    fn test_alias_resolves_to_input() {
        let (_core, m) = manager();
        let input = m.register_input("long/input/name", "double", "").unwrap();
        input.add_alias("short").unwrap();
        assert_eq!(m.input("short").unwrap().handle(), input.handle());
        assert_eq!(m.input_by_target("short").unwrap().handle(), input.handle());
        assert!(matches!(
            input.add_alias("short"),
            Err(FederateError::RegistrationFailure(_)) | Err(FederateError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_remove_target_stops_updates() {
        let (_core, m) = manager();
        let publication = m.register_publication("pub", "double", "").unwrap();
        let input = m.register_input("in", "double", "").unwrap();
        input.add_target("pub").unwrap();
        input.remove_target("pub").unwrap();
        assert_eq!(input.target(), "");
        assert!(m.input_by_target("pub").is_none());

        publication.publish(1.0).unwrap();
        m.update_time(Time::from_secs_f64(1.0));
        assert!(!input.is_updated());
    }

    #[test]
    fn test_metadata_after_resolution() {
        let (_core, m) = manager();
        m.register_publication("pub", "double", "kW").unwrap();
        let input = m.register_input("in", "", "W").unwrap();
        input.add_target("pub").unwrap();
        m.enter_initializing().unwrap();

        assert_eq!(input.injection_type().unwrap(), shared_types::DataType::Double);
        assert_eq!(input.injection_units().unwrap(), "kW");
        assert_eq!(input.units().unwrap(), "W");
        assert_eq!(input.data_type().unwrap(), shared_types::DataType::Double);
    }
}
