//! Outbound Ports (Driven Ports / SPI)
//!
//! The manager never moves bytes itself: routing, storage of the latest
//! values and update bookkeeping belong to the [`Core`].

use shared_types::{FederateError, FederateId, InterfaceHandle};

/// Routing collaborator that owns handles and moves encoded values.
///
/// Implementations must be callable from several threads at once.
pub trait Core: Send + Sync {
    fn register_publication(
        &self,
        fed: FederateId,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<InterfaceHandle, FederateError>;

    fn register_input(
        &self,
        fed: FederateId,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<InterfaceHandle, FederateError>;

    /// Publish encoded bytes on a publication.
    fn set_value(&self, handle: InterfaceHandle, data: &[u8]) -> Result<(), FederateError>;

    /// Most recent bytes delivered to an input; empty if none.
    fn get_value(&self, handle: InterfaceHandle) -> Vec<u8>;

    /// Current bytes of every source feeding an input, in source order.
    fn get_all_values(&self, handle: InterfaceHandle) -> Vec<Vec<u8>>;

    /// Inputs of `fed` that received data since the last call.
    fn get_value_updates(&self, fed: FederateId) -> Vec<InterfaceHandle>;

    /// Subscribe an input to the publication named `target`.
    fn add_source_target(&self, handle: InterfaceHandle, target: &str)
        -> Result<(), FederateError>;

    /// Feed a publication into the input named `target`.
    fn add_destination_target(
        &self,
        handle: InterfaceHandle,
        target: &str,
    ) -> Result<(), FederateError>;

    fn remove_target(&self, handle: InterfaceHandle, target: &str);

    /// Make `alias` resolve to the interface registered as `name`.
    fn add_alias(&self, name: &str, alias: &str) -> Result<(), FederateError>;

    /// Type the interface itself expects.
    fn get_extraction_type(&self, handle: InterfaceHandle) -> String;

    fn get_extraction_units(&self, handle: InterfaceHandle) -> String;

    /// Type of the data actually arriving (the source's type for an input).
    fn get_injection_type(&self, handle: InterfaceHandle) -> String;

    fn get_injection_units(&self, handle: InterfaceHandle) -> String;
}

/// Numeric unit conversion, treated as an opaque utility.
pub trait UnitConverter: Send + Sync {
    /// Convert `value` from `from` units to `to` units; `None` when the
    /// units are incompatible.
    fn convert(&self, value: f64, from: &str, to: &str) -> Option<f64>;
}

/// Mock implementations for testing
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

    /// Core that accepts every registration, including duplicate names,
    /// and never has data.
    #[derive(Default)]
    pub struct PermissiveCore {
        next: AtomicI32,
        /// When set, `set_value` fails with `Disconnected`.
        pub reject_values: AtomicBool,
        /// Values accepted by `set_value`.
        pub accepted_values: AtomicUsize,
    }

    impl Core for PermissiveCore {
        fn register_publication(
            &self,
            _fed: FederateId,
            _key: &str,
            _type_name: &str,
            _units: &str,
        ) -> Result<InterfaceHandle, FederateError> {
            Ok(InterfaceHandle::new(self.next.fetch_add(1, Ordering::Relaxed)))
        }

        fn register_input(
            &self,
            fed: FederateId,
            key: &str,
            type_name: &str,
            units: &str,
        ) -> Result<InterfaceHandle, FederateError> {
            self.register_publication(fed, key, type_name, units)
        }

        fn set_value(&self, _handle: InterfaceHandle, _data: &[u8]) -> Result<(), FederateError> {
            if self.reject_values.load(Ordering::SeqCst) {
                return Err(FederateError::Disconnected);
            }
            self.accepted_values.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn get_value(&self, _handle: InterfaceHandle) -> Vec<u8> {
            Vec::new()
        }

        fn get_all_values(&self, _handle: InterfaceHandle) -> Vec<Vec<u8>> {
            Vec::new()
        }

        fn get_value_updates(&self, _fed: FederateId) -> Vec<InterfaceHandle> {
            Vec::new()
        }

        fn add_source_target(
            &self,
            _handle: InterfaceHandle,
            _target: &str,
        ) -> Result<(), FederateError> {
            Ok(())
        }

        fn add_destination_target(
            &self,
            _handle: InterfaceHandle,
            _target: &str,
        ) -> Result<(), FederateError> {
            Ok(())
        }

        fn remove_target(&self, _handle: InterfaceHandle, _target: &str) {}

        fn add_alias(&self, _name: &str, _alias: &str) -> Result<(), FederateError> {
            Ok(())
        }

        fn get_extraction_type(&self, _handle: InterfaceHandle) -> String {
            String::new()
        }

        fn get_extraction_units(&self, _handle: InterfaceHandle) -> String {
            String::new()
        }

        fn get_injection_type(&self, _handle: InterfaceHandle) -> String {
            String::new()
        }

        fn get_injection_units(&self, _handle: InterfaceHandle) -> String {
            String::new()
        }
    }
}
