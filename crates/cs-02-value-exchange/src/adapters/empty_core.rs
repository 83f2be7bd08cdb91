//! No-op Core installed by `disconnect()`.
//!
//! Interface objects retained after teardown keep working against it: they
//! publish into nothing and never receive updates. New registrations fail.

use crate::ports::outbound::Core;
use shared_types::{FederateError, FederateId, InterfaceHandle};

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCore;

impl Core for EmptyCore {
    fn register_publication(
        &self,
        _fed: FederateId,
        _key: &str,
        _type_name: &str,
        _units: &str,
    ) -> Result<InterfaceHandle, FederateError> {
        Err(FederateError::Disconnected)
    }

    fn register_input(
        &self,
        _fed: FederateId,
        _key: &str,
        _type_name: &str,
        _units: &str,
    ) -> Result<InterfaceHandle, FederateError> {
        Err(FederateError::Disconnected)
    }

    fn set_value(&self, _handle: InterfaceHandle, _data: &[u8]) -> Result<(), FederateError> {
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

    fn add_source_target(&self, _handle: InterfaceHandle, _target: &str) -> Result<(), FederateError> {
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
