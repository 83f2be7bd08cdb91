//! # In-memory Core
//!
//! Loopback broker for several federates in one process. Routing is by
//! name: an input is fed by every publication named in its targets, and by
//! every publication that names the input (or one of its aliases) as a
//! destination. Names resolve when data moves, so targets may be added
//! before the interface they name exists.

use crate::ports::outbound::Core;
use parking_lot::Mutex;
use shared_types::{FederateError, FederateId, InterfaceHandle};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Publication,
    Input,
}

#[derive(Debug)]
struct CoreInterface {
    kind: Kind,
    owner: FederateId,
    type_name: String,
    units: String,
    targets: Vec<String>,
    /// Last published bytes (publications) or last delivered bytes (inputs).
    value: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct CoreState {
    interfaces: BTreeMap<InterfaceHandle, CoreInterface>,
    publication_names: HashMap<String, InterfaceHandle>,
    input_names: HashMap<String, InterfaceHandle>,
    pending: HashMap<FederateId, BTreeSet<InterfaceHandle>>,
    federates: Vec<String>,
    next_handle: i32,
}

impl CoreState {
    fn names_mut(&mut self, kind: Kind) -> &mut HashMap<String, InterfaceHandle> {
        match kind {
            Kind::Publication => &mut self.publication_names,
            Kind::Input => &mut self.input_names,
        }
    }

    fn register(
        &mut self,
        kind: Kind,
        fed: FederateId,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<InterfaceHandle, FederateError> {
        if !key.is_empty() && self.names_mut(kind).contains_key(key) {
            return Err(FederateError::RegistrationFailure(format!(
                "'{key}' is already registered"
            )));
        }
        let handle = InterfaceHandle::new(self.next_handle);
        self.next_handle += 1;
        if !key.is_empty() {
            self.names_mut(kind).insert(key.to_string(), handle);
        }
        self.interfaces.insert(
            handle,
            CoreInterface {
                kind,
                owner: fed,
                type_name: type_name.to_string(),
                units: units.to_string(),
                targets: Vec::new(),
                value: None,
            },
        );
        Ok(handle)
    }

    fn interface(&self, handle: InterfaceHandle, kind: Kind) -> Result<&CoreInterface, FederateError> {
        self.interfaces
            .get(&handle)
            .filter(|iface| iface.kind == kind)
            .ok_or_else(|| FederateError::InvalidIdentifier(handle.to_string()))
    }

    fn connected(&self, publication: InterfaceHandle, input: InterfaceHandle) -> bool {
        let (Some(pub_iface), Some(input_iface)) =
            (self.interfaces.get(&publication), self.interfaces.get(&input))
        else {
            return false;
        };
        input_iface
            .targets
            .iter()
            .any(|t| self.publication_names.get(t) == Some(&publication))
            || pub_iface
                .targets
                .iter()
                .any(|t| self.input_names.get(t) == Some(&input))
    }

    /// Publications feeding `input`, in handle order.
    fn sources_of(&self, input: InterfaceHandle) -> Vec<InterfaceHandle> {
        self.interfaces
            .iter()
            .filter(|(h, iface)| iface.kind == Kind::Publication && self.connected(**h, input))
            .map(|(h, _)| *h)
            .collect()
    }

    /// Inputs fed by `publication`, in handle order.
    fn destinations_of(&self, publication: InterfaceHandle) -> Vec<InterfaceHandle> {
        self.interfaces
            .iter()
            .filter(|(h, iface)| iface.kind == Kind::Input && self.connected(publication, **h))
            .map(|(h, _)| *h)
            .collect()
    }

    fn deliver(&mut self, input: InterfaceHandle, data: &[u8]) {
        if let Some(iface) = self.interfaces.get_mut(&input) {
            iface.value = Some(data.to_vec());
            let owner = iface.owner;
            self.pending.entry(owner).or_default().insert(input);
        }
    }

    /// Hand an existing published value to a newly connected input.
    fn catch_up(&mut self, publication: InterfaceHandle, input: InterfaceHandle) {
        let value = self
            .interfaces
            .get(&publication)
            .and_then(|iface| iface.value.clone());
        if let Some(value) = value {
            self.deliver(input, &value);
        }
    }

    fn add_target(
        &mut self,
        handle: InterfaceHandle,
        kind: Kind,
        target: &str,
    ) -> Result<(), FederateError> {
        let iface = self
            .interfaces
            .get_mut(&handle)
            .filter(|iface| iface.kind == kind)
            .ok_or_else(|| FederateError::InvalidIdentifier(handle.to_string()))?;
        if !iface.targets.iter().any(|t| t == target) {
            iface.targets.push(target.to_string());
        }
        match kind {
            Kind::Input => {
                if let Some(&publication) = self.publication_names.get(target) {
                    self.catch_up(publication, handle);
                }
            }
            Kind::Publication => {
                if let Some(&input) = self.input_names.get(target) {
                    self.catch_up(handle, input);
                }
            }
        }
        Ok(())
    }
}

/// Shared in-process broker.
#[derive(Debug, Default)]
pub struct InMemoryCore {
    state: Mutex<CoreState>,
}

impl InMemoryCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a federate joining this broker.
    pub fn register_federate(&self, name: &str) -> FederateId {
        let mut state = self.state.lock();
        state.federates.push(name.to_string());
        let id = FederateId((state.federates.len() - 1) as i32);
        debug!(federate = name, %id, "Federate joined in-memory core");
        id
    }

    pub fn federate_name(&self, id: FederateId) -> Option<String> {
        let index = usize::try_from(id.0).ok()?;
        self.state.lock().federates.get(index).cloned()
    }

    pub fn interface_count(&self) -> usize {
        self.state.lock().interfaces.len()
    }
}

impl Core for InMemoryCore {
    fn register_publication(
        &self,
        fed: FederateId,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<InterfaceHandle, FederateError> {
        self.state
            .lock()
            .register(Kind::Publication, fed, key, type_name, units)
    }

    fn register_input(
        &self,
        fed: FederateId,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<InterfaceHandle, FederateError> {
        self.state
            .lock()
            .register(Kind::Input, fed, key, type_name, units)
    }

    fn set_value(&self, handle: InterfaceHandle, data: &[u8]) -> Result<(), FederateError> {
        let mut state = self.state.lock();
        state.interface(handle, Kind::Publication)?;
        if let Some(iface) = state.interfaces.get_mut(&handle) {
            iface.value = Some(data.to_vec());
        }
        for input in state.destinations_of(handle) {
            state.deliver(input, data);
        }
        Ok(())
    }

    fn get_value(&self, handle: InterfaceHandle) -> Vec<u8> {
        self.state
            .lock()
            .interfaces
            .get(&handle)
            .and_then(|iface| iface.value.clone())
            .unwrap_or_default()
    }

    fn get_all_values(&self, handle: InterfaceHandle) -> Vec<Vec<u8>> {
        let state = self.state.lock();
        state
            .sources_of(handle)
            .into_iter()
            .filter_map(|source| state.interfaces.get(&source)?.value.clone())
            .collect()
    }

    fn get_value_updates(&self, fed: FederateId) -> Vec<InterfaceHandle> {
        self.state
            .lock()
            .pending
            .remove(&fed)
            .map(|handles| handles.into_iter().collect())
            .unwrap_or_default()
    }

    fn add_source_target(&self, handle: InterfaceHandle, target: &str) -> Result<(), FederateError> {
        self.state.lock().add_target(handle, Kind::Input, target)
    }

    fn add_destination_target(
        &self,
        handle: InterfaceHandle,
        target: &str,
    ) -> Result<(), FederateError> {
        self.state.lock().add_target(handle, Kind::Publication, target)
    }

    fn remove_target(&self, handle: InterfaceHandle, target: &str) {
        if let Some(iface) = self.state.lock().interfaces.get_mut(&handle) {
            iface.targets.retain(|t| t != target);
        }
    }

    fn add_alias(&self, name: &str, alias: &str) -> Result<(), FederateError> {
        let mut state = self.state.lock();
        let kind = if state.publication_names.contains_key(name) {
            Kind::Publication
        } else if state.input_names.contains_key(name) {
            Kind::Input
        } else {
            return Err(FederateError::InvalidIdentifier(name.to_string()));
        };
        let names = state.names_mut(kind);
        if names.contains_key(alias) {
            return Err(FederateError::RegistrationFailure(format!(
                "alias '{alias}' is already in use"
            )));
        }
        if let Some(&handle) = names.get(name) {
            names.insert(alias.to_string(), handle);
        }
        Ok(())
    }

    fn get_extraction_type(&self, handle: InterfaceHandle) -> String {
        self.state
            .lock()
            .interfaces
            .get(&handle)
            .map(|iface| iface.type_name.clone())
            .unwrap_or_default()
    }

    fn get_extraction_units(&self, handle: InterfaceHandle) -> String {
        self.state
            .lock()
            .interfaces
            .get(&handle)
            .map(|iface| iface.units.clone())
            .unwrap_or_default()
    }

    fn get_injection_type(&self, handle: InterfaceHandle) -> String {
        let state = self.state.lock();
        match state.interfaces.get(&handle) {
            Some(iface) if iface.kind == Kind::Input => state
                .sources_of(handle)
                .first()
                .and_then(|source| state.interfaces.get(source))
                .map(|source| source.type_name.clone())
                .unwrap_or_default(),
            Some(iface) => iface.type_name.clone(),
            None => String::new(),
        }
    }

    fn get_injection_units(&self, handle: InterfaceHandle) -> String {
        let state = self.state.lock();
        match state.interfaces.get(&handle) {
            Some(iface) if iface.kind == Kind::Input => state
                .sources_of(handle)
                .first()
                .and_then(|source| state.interfaces.get(source))
                .map(|source| source.units.clone())
                .unwrap_or_default(),
            Some(iface) => iface.units.clone(),
            None => String::new(),
        }
    }
}
