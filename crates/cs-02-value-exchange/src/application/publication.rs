//! Application-facing view of one registered publication.

use crate::application::manager::ManagerShared;
use serde::Serialize;
use shared_types::{DataType, FederateError, InterfaceHandle, Value};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

#[derive(Clone, Default)]
pub struct Publication {
    handle: InterfaceHandle,
    index: usize,
    name: String,
    manager: Weak<ManagerShared>,
}

impl fmt::Debug for Publication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publication")
            .field("handle", &self.handle)
            .field("index", &self.index)
            .field("name", &self.name)
            .finish()
    }
}

impl Publication {
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
                "publication is not registered".to_string(),
            ));
        }
        self.manager.upgrade().ok_or(FederateError::Disconnected)
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    pub fn handle(&self) -> InterfaceHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Convert `value` to the publication's type and send it, unless change
    /// detection suppresses it.
    pub fn publish(&self, value: impl Into<Value>) -> Result<(), FederateError> {
        self.manager()?.publish_value(self.index, value.into())
    }

    /// Serialize a custom type with the federate's encoding and send it
    /// unchanged.
    pub fn publish_custom<T: Serialize>(&self, value: &T) -> Result<(), FederateError> {
        let manager = self.manager()?;
        let bytes = manager.config.encoding.encode(value)?;
        manager.publish_bytes(self.index, &bytes)
    }

    pub fn publish_raw(&self, bytes: &[u8]) -> Result<(), FederateError> {
        self.manager()?.publish_bytes(self.index, bytes)
    }

    pub fn add_target(&self, target: &str) -> Result<(), FederateError> {
        self.manager()?.add_publication_target(self.handle, target)
    }

    pub fn remove_target(&self, target: &str) -> Result<(), FederateError> {
        self.manager()?
            .remove_publication_target(self.handle, target);
        Ok(())
    }

    pub fn targets(&self) -> Result<Vec<String>, FederateError> {
        Ok(self.manager()?.publication_targets_of(self.handle))
    }

    pub fn add_alias(&self, alias: &str) -> Result<(), FederateError> {
        self.manager()?
            .add_publication_alias(self.handle, &self.name, alias)
    }

    pub fn set_minimum_change(&self, delta: f64) -> Result<(), FederateError> {
        self.modify(|rec| rec.set_minimum_change(delta))
    }

    pub fn enable_change_detection(&self, enabled: bool) -> Result<(), FederateError> {
        self.modify(|rec| rec.enable_change_detection(enabled))
    }

    pub fn type_name(&self) -> Result<String, FederateError> {
        self.read(|rec| rec.type_name.clone())
    }

    pub fn data_type(&self) -> Result<DataType, FederateError> {
        self.read(|rec| rec.data_type)
    }

    pub fn units(&self) -> Result<String, FederateError> {
        self.read(|rec| rec.units.clone())
    }

    fn read<R>(
        &self,
        f: impl FnOnce(&crate::domain::publication_record::PublicationRecord) -> R,
    ) -> Result<R, FederateError> {
        self.manager()?
            .publications
            .with_index(self.index, f)
            .ok_or_else(|| unknown_publication(self.index))
    }

    fn modify<R>(
        &self,
        f: impl FnOnce(&mut crate::domain::publication_record::PublicationRecord) -> R,
    ) -> Result<R, FederateError> {
        self.manager()?
            .publications
            .modify_index(self.index, f)
            .ok_or_else(|| unknown_publication(self.index))
    }
}

fn unknown_publication(index: usize) -> FederateError {
    FederateError::InvalidIdentifier(format!("no publication at index {index}"))
}

impl ManagerShared {
    /// Prepare under the registry lock, then hand the bytes to the Core with
    /// no lock held. The value becomes the change-detection reference only
    /// once the Core has accepted it.
    fn publish_value(&self, index: usize, value: Value) -> Result<(), FederateError> {
        let (handle, prepared) = self
            .publications
            .with_index(index, |rec| {
                rec.prepare(value).map(|prepared| (rec.handle, prepared))
            })
            .ok_or_else(|| unknown_publication(index))??;
        let Some(value) = prepared else {
            trace!(%handle, "Publish suppressed by change detection");
            return Ok(());
        };
        let bytes = self.config.encoding.encode_value(&value)?;
        self.core().set_value(handle, &bytes)?;
        self.publications.modify_index(index, |rec| rec.commit(value));
        Ok(())
    }

    fn publish_bytes(&self, index: usize, bytes: &[u8]) -> Result<(), FederateError> {
        let handle = self
            .publications
            .handle_at(index)
            .ok_or_else(|| unknown_publication(index))?;
        self.core().set_value(handle, bytes)
    }
}
