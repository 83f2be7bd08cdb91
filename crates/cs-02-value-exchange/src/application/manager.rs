//! # Value Federate Manager
//!
//! Owns the input and publication registries of one federate and moves
//! data between them and the [`Core`].
//!
//! ## Time Advance
//!
//! `update_time(t)` records `t`, asks the Core which inputs have data, and
//! processes them in registry order. For each handle the registry is read,
//! the Core is queried with no lock held, the runtime arena is updated, and
//! the record is written under the exclusive lock. Every guard is released
//! before a callback runs, so callbacks may re-enter the manager. A handle
//! the Core reports again while a callback runs is picked up on the next
//! time advance.
//!
//! Registration asks the Core first and the registry second. If the Core
//! accepts a name that then collides locally, the Core-side handle is left
//! orphaned and the caller gets `RegistrationFailure`.

use crate::adapters::empty_core::EmptyCore;
use crate::adapters::units::IdentityUnits;
use crate::application::input::Input;
use crate::application::publication::Publication;
use crate::application::runtime::InputData;
use crate::config::ValueFederateConfig;
use crate::domain::input_record::{Incoming, InputRecord};
use crate::domain::multi_input::MultiInputMode;
use crate::domain::publication_record::PublicationRecord;
use crate::domain::state::FederateState;
use crate::domain::value_type::FromValue;
use crate::ports::outbound::{Core, UnitConverter};
use cs_01_interface_registry::{InterfaceRegistry, RecordArena};
use parking_lot::RwLock;
use shared_types::{clean_type_name, FederateError, FederateId, InterfaceHandle, Time};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Callback invoked with the updated input and the time of the update.
pub type InputCallback = Arc<dyn Fn(&Input, Time) + Send + Sync>;

/// State shared between the manager and the handles it gives out.
pub(crate) struct ManagerShared {
    pub(super) fed_id: FederateId,
    pub(super) config: ValueFederateConfig,
    core: RwLock<Arc<dyn Core>>,
    pub(super) units: Arc<dyn UnitConverter>,
    pub(super) inputs: InterfaceRegistry<InputRecord>,
    pub(super) publications: InterfaceRegistry<PublicationRecord>,
    pub(super) input_data: RecordArena<InputData>,
    target_ids: RwLock<BTreeMap<String, Vec<InterfaceHandle>>>,
    pub(super) input_targets: RwLock<BTreeMap<InterfaceHandle, Vec<String>>>,
    publication_targets: RwLock<BTreeMap<InterfaceHandle, Vec<String>>>,
    all_callback: RwLock<Option<InputCallback>>,
    current_time: AtomicI64,
    state: RwLock<FederateState>,
}

struct Notification {
    input: Input,
    callback: Option<InputCallback>,
}

fn registration_error(kind: &str, key: &str, err: FederateError) -> FederateError {
    match err {
        FederateError::RegistrationFailure(_) => err,
        other => FederateError::RegistrationFailure(format!(
            "Unable to register {kind} '{key}': {other}"
        )),
    }
}

impl ManagerShared {
    pub(super) fn core(&self) -> Arc<dyn Core> {
        Arc::clone(&self.core.read())
    }

    pub(super) fn current_time(&self) -> Time {
        Time::from_nanos(self.current_time.load(Ordering::Acquire))
    }

    fn registered_type_name(&self, type_name: &str) -> String {
        self.config
            .encoding
            .forced_type_name()
            .map(str::to_string)
            .unwrap_or_else(|| clean_type_name(type_name))
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    fn register_input(
        self: &Arc<Self>,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Input, FederateError> {
        let type_name = self.registered_type_name(type_name);
        let handle = self
            .core()
            .register_input(self.fed_id, key, &type_name, units)
            .map_err(|e| registration_error("input", key, e))?;
        if !handle.is_valid() {
            return Err(FederateError::RegistrationFailure(format!(
                "Core returned an invalid handle for input '{key}'"
            )));
        }

        let data_index = self.input_data.push(InputData::default());
        let record = InputRecord::new(
            handle,
            key,
            &type_name,
            units,
            data_index,
            self.config.default_multi_input_mode,
        );
        let index = self
            .inputs
            .insert(key, handle, self.fed_id, record)
            .ok_or_else(|| self.orphaned("input", key, handle))?;
        Ok(Input::new(handle, index, key, Arc::downgrade(self)))
    }

    fn register_publication(
        self: &Arc<Self>,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Publication, FederateError> {
        let type_name = self.registered_type_name(type_name);
        let handle = self
            .core()
            .register_publication(self.fed_id, key, &type_name, units)
            .map_err(|e| registration_error("publication", key, e))?;
        if !handle.is_valid() {
            return Err(FederateError::RegistrationFailure(format!(
                "Core returned an invalid handle for publication '{key}'"
            )));
        }

        let record = PublicationRecord::new(handle, key, &type_name, units);
        let index = self
            .publications
            .insert(key, handle, self.fed_id, record)
            .ok_or_else(|| self.orphaned("publication", key, handle))?;
        Ok(Publication::new(handle, index, key, Arc::downgrade(self)))
    }

    fn orphaned(&self, kind: &str, key: &str, handle: InterfaceHandle) -> FederateError {
        warn!(
            fed = %self.fed_id,
            kind,
            key,
            %handle,
            "Core accepted registration but the name is taken locally; core handle orphaned"
        );
        FederateError::RegistrationFailure(format!("Unable to register {kind} '{key}': duplicate name"))
    }

    // =========================================================================
    // TARGETS & ALIASES
    // =========================================================================

    fn report_duplicate_target(&self, kind: &str, handle: InterfaceHandle, target: &str) {
        if self.config.warn_on_duplicate_targets {
            warn!(fed = %self.fed_id, kind, %handle, target, "Duplicate target ignored");
        } else {
            debug!(fed = %self.fed_id, kind, %handle, target, "Duplicate target ignored");
        }
    }

    /// Add `target` to a handle's list; `false` if it was already there.
    fn push_target(
        map: &RwLock<BTreeMap<InterfaceHandle, Vec<String>>>,
        handle: InterfaceHandle,
        target: &str,
    ) -> bool {
        let mut targets = map.write();
        let list = targets.entry(handle).or_default();
        if list.iter().any(|t| t == target) {
            return false;
        }
        list.push(target.to_string());
        true
    }

    fn drop_target(
        map: &RwLock<BTreeMap<InterfaceHandle, Vec<String>>>,
        handle: InterfaceHandle,
        target: &str,
    ) -> bool {
        let mut targets = map.write();
        let Some(list) = targets.get_mut(&handle) else {
            return false;
        };
        let before = list.len();
        list.retain(|t| t != target);
        before != list.len()
    }

    /// Record that `handle` is reachable under `key` (a subscription
    /// target, a publication destination or an input alias).
    fn link_target_id(&self, key: &str, handle: InterfaceHandle) {
        self.target_ids
            .write()
            .entry(key.to_string())
            .or_default()
            .push(handle);
    }

    fn unlink_target_id(&self, key: &str, handle: InterfaceHandle) {
        let mut ids = self.target_ids.write();
        if let Some(handles) = ids.get_mut(key) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                ids.remove(key);
            }
        }
    }

    /// Every key in the target index, sorted.
    pub(super) fn target_keys(&self) -> Vec<String> {
        self.target_ids.read().keys().cloned().collect()
    }

    pub(super) fn add_input_target(
        &self,
        handle: InterfaceHandle,
        target: &str,
    ) -> Result<(), FederateError> {
        if !Self::push_target(&self.input_targets, handle, target) {
            self.report_duplicate_target("input", handle, target);
            return Ok(());
        }
        if let Err(err) = self.core().add_source_target(handle, target) {
            Self::drop_target(&self.input_targets, handle, target);
            return Err(err);
        }
        self.link_target_id(target, handle);
        debug!(fed = %self.fed_id, %handle, target, "Added input target");
        Ok(())
    }

    pub(super) fn remove_input_target(&self, handle: InterfaceHandle, target: &str) {
        if !Self::drop_target(&self.input_targets, handle, target) {
            return;
        }
        self.core().remove_target(handle, target);
        self.unlink_target_id(target, handle);
        debug!(fed = %self.fed_id, %handle, target, "Removed input target");
    }

    pub(super) fn add_publication_target(
        &self,
        handle: InterfaceHandle,
        target: &str,
    ) -> Result<(), FederateError> {
        if !Self::push_target(&self.publication_targets, handle, target) {
            self.report_duplicate_target("publication", handle, target);
            return Ok(());
        }
        if let Err(err) = self.core().add_destination_target(handle, target) {
            Self::drop_target(&self.publication_targets, handle, target);
            return Err(err);
        }
        self.link_target_id(target, handle);
        debug!(fed = %self.fed_id, %handle, target, "Added publication target");
        Ok(())
    }

    pub(super) fn remove_publication_target(&self, handle: InterfaceHandle, target: &str) {
        if Self::drop_target(&self.publication_targets, handle, target) {
            self.core().remove_target(handle, target);
            self.unlink_target_id(target, handle);
            debug!(fed = %self.fed_id, %handle, target, "Removed publication target");
        }
    }

    pub(super) fn targets_of(&self, handle: InterfaceHandle) -> Vec<String> {
        self.input_targets
            .read()
            .get(&handle)
            .cloned()
            .unwrap_or_default()
    }

    pub(super) fn publication_targets_of(&self, handle: InterfaceHandle) -> Vec<String> {
        self.publication_targets
            .read()
            .get(&handle)
            .cloned()
            .unwrap_or_default()
    }

    pub(super) fn add_input_alias(
        &self,
        handle: InterfaceHandle,
        name: &str,
        alias: &str,
    ) -> Result<(), FederateError> {
        self.core().add_alias(name, alias)?;
        if !self.inputs.add_search_term(alias, handle) {
            return Err(FederateError::RegistrationFailure(format!(
                "alias '{alias}' is already in use"
            )));
        }
        self.link_target_id(alias, handle);
        Ok(())
    }

    pub(super) fn add_publication_alias(
        &self,
        handle: InterfaceHandle,
        name: &str,
        alias: &str,
    ) -> Result<(), FederateError> {
        self.core().add_alias(name, alias)?;
        if !self.publications.add_search_term(alias, handle) {
            return Err(FederateError::RegistrationFailure(format!(
                "alias '{alias}' is already in use"
            )));
        }
        Ok(())
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    fn input_at(self: &Arc<Self>, index: usize) -> Option<Input> {
        let store = self.inputs.read();
        let handle = store.handle_at(index)?;
        let name = store.get(index)?.name.clone();
        drop(store);
        Some(Input::new(handle, index, &name, Arc::downgrade(self)))
    }

    fn publication_at(self: &Arc<Self>, index: usize) -> Option<Publication> {
        let store = self.publications.read();
        let handle = store.handle_at(index)?;
        let name = store.get(index)?.name.clone();
        drop(store);
        Some(Publication::new(handle, index, &name, Arc::downgrade(self)))
    }

    /// Index of `input` in this manager's registry, verifying the handle
    /// still matches.
    pub(super) fn input_index(&self, input: &Input) -> Result<usize, FederateError> {
        if !input.is_valid() {
            return Err(FederateError::InvalidIdentifier(
                "input is not registered".to_string(),
            ));
        }
        match self.inputs.handle_at(input.index()) {
            Some(handle) if handle == input.handle() => Ok(input.index()),
            _ => Err(FederateError::InvalidIdentifier(format!(
                "input '{}' does not belong to this federate",
                input.name()
            ))),
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    fn transition(&self, next: FederateState) -> Result<(), FederateError> {
        let mut state = self.state.write();
        if !state.can_transition_to(next) {
            return Err(FederateError::InvalidFunctionCall(format!(
                "cannot move from {} to {next}",
                *state
            )));
        }
        info!(fed = %self.fed_id, from = %*state, to = %next, "Federate state transition");
        *state = next;
        Ok(())
    }

    /// Ask the Core for the source type and units of every input still
    /// unresolved.
    fn resolve_sources(&self) {
        let core = self.core();
        let unresolved: Vec<(usize, InterfaceHandle)> = self
            .inputs
            .read()
            .iter()
            .enumerate()
            .filter(|(_, rec)| !rec.source_resolved)
            .map(|(index, rec)| (index, rec.handle))
            .collect();

        for (index, handle) in unresolved {
            let type_name = core.get_injection_type(handle);
            let units = core.get_injection_units(handle);
            self.inputs
                .modify_index(index, |rec| rec.resolve_source(&type_name, &units));
        }
    }

    fn update_time(self: &Arc<Self>, new_time: Time) {
        self.current_time
            .store(new_time.as_nanos(), Ordering::Release);
        let core = self.core();
        let mut handles = core.get_value_updates(self.fed_id);
        if handles.is_empty() {
            return;
        }
        {
            let store = self.inputs.read();
            handles.sort_by_key(|h| store.index_of_handle(*h).unwrap_or(usize::MAX));
        }
        handles.dedup();

        let all_callback = self.all_callback.read().clone();
        for handle in handles {
            match self.apply_update(core.as_ref(), handle, new_time) {
                Ok(Some(notification)) => {
                    if let Some(callback) = notification.callback.or_else(|| all_callback.clone()) {
                        callback(&notification.input, new_time);
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        fed = %self.fed_id,
                        %handle,
                        error = %err,
                        "Failed to apply input update; continuing"
                    );
                }
            }
        }
    }

    /// Fetch and apply one handle's data. Returns a notification when the
    /// update qualified.
    fn apply_update(
        self: &Arc<Self>,
        core: &dyn Core,
        handle: InterfaceHandle,
        time: Time,
    ) -> Result<Option<Notification>, FederateError> {
        let located = {
            let store = self.inputs.read();
            store.index_of_handle(handle).and_then(|index| {
                store.get(index).map(|rec| {
                    (
                        index,
                        rec.name.clone(),
                        rec.multi_input_mode,
                        rec.data_index,
                        rec.source_resolved,
                    )
                })
            })
        };
        let Some((index, name, mode, data_index, resolved)) = located else {
            debug!(fed = %self.fed_id, %handle, "Update for unknown input ignored");
            return Ok(None);
        };

        if !resolved {
            let type_name = core.get_injection_type(handle);
            let units = core.get_injection_units(handle);
            self.inputs
                .modify_index(index, |rec| rec.resolve_source(&type_name, &units));
        }

        let incoming = if mode == MultiInputMode::NoOp {
            let bytes = core.get_value(handle);
            self.input_data.with_mut(data_index, |data| {
                data.last_data = Some(bytes.clone());
                data.last_update = time;
                data.has_update = true;
            });
            Incoming::Single(bytes)
        } else {
            let all = core.get_all_values(handle);
            self.input_data.with_mut(data_index, |data| {
                data.last_update = time;
                data.has_update = true;
            });
            Incoming::Multiple(all)
        };

        let encoding = self.config.encoding;
        let units = self.units.as_ref();
        let updated = self
            .inputs
            .modify_index(index, |rec| rec.ingest(&incoming, encoding, units))
            .ok_or_else(|| FederateError::InvalidIdentifier(handle.to_string()))??;
        if !updated {
            return Ok(None);
        }

        let callback = self
            .input_data
            .with(data_index, |data| data.callback.clone())
            .flatten();
        Ok(Some(Notification {
            input: Input::new(handle, index, &name, Arc::downgrade(self)),
            callback,
        }))
    }

    // =========================================================================
    // UPDATE FLAGS & CALLBACKS
    // =========================================================================

    pub(super) fn set_input_callback(
        &self,
        index: usize,
        callback: InputCallback,
    ) -> Result<(), FederateError> {
        let data_index = self.read_input(index, |rec| rec.data_index)?;
        self.input_data
            .with_mut(data_index, |data| data.callback = Some(callback));
        Ok(())
    }

    fn clear_updates(&self) {
        self.inputs.apply(|rec| rec.updated = false);
        self.input_data.for_each_mut(|data| data.has_update = false);
    }

    pub(super) fn query_updates(&self) -> Vec<usize> {
        self.inputs
            .read()
            .iter()
            .enumerate()
            .filter(|(_, rec)| rec.updated)
            .map(|(index, _)| index)
            .collect()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Value-exchange side of one federate.
///
/// Dropping the manager invalidates every [`Input`] and [`Publication`] it
/// handed out; their operations then return `FederateError::Disconnected`.
pub struct ValueFederateManager {
    shared: Arc<ManagerShared>,
}

impl ValueFederateManager {
    pub fn new(core: Arc<dyn Core>, fed_id: FederateId, config: ValueFederateConfig) -> Self {
        Self::with_unit_converter(core, fed_id, config, Arc::new(IdentityUnits))
    }

    pub fn with_unit_converter(
        core: Arc<dyn Core>,
        fed_id: FederateId,
        config: ValueFederateConfig,
        units: Arc<dyn UnitConverter>,
    ) -> Self {
        Self {
            shared: Arc::new(ManagerShared {
                fed_id,
                config,
                core: RwLock::new(core),
                units,
                inputs: InterfaceRegistry::new("input"),
                publications: InterfaceRegistry::new("publication"),
                input_data: RecordArena::new(),
                target_ids: RwLock::new(BTreeMap::new()),
                input_targets: RwLock::new(BTreeMap::new()),
                publication_targets: RwLock::new(BTreeMap::new()),
                all_callback: RwLock::new(None),
                current_time: AtomicI64::new(Time::MIN.as_nanos()),
                state: RwLock::new(FederateState::Startup),
            }),
        }
    }

    pub fn federate_id(&self) -> FederateId {
        self.shared.fed_id
    }

    pub fn config(&self) -> &ValueFederateConfig {
        &self.shared.config
    }

    pub fn state(&self) -> FederateState {
        *self.shared.state.read()
    }

    /// Time of the most recent grant; [`Time::MIN`] before the first.
    pub fn current_time(&self) -> Time {
        self.shared.current_time()
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Register a publication. An empty key creates a publication that
    /// cannot be looked up by name and never collides.
    pub fn register_publication(
        &self,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Publication, FederateError> {
        self.shared.register_publication(key, type_name, units)
    }

    /// Register a publication typed after `T`.
    pub fn register_typed_publication<T: FromValue>(
        &self,
        key: &str,
        units: &str,
    ) -> Result<Publication, FederateError> {
        self.shared
            .register_publication(key, T::DATA_TYPE.name(), units)
    }

    pub fn register_input(
        &self,
        key: &str,
        type_name: &str,
        units: &str,
    ) -> Result<Input, FederateError> {
        self.shared.register_input(key, type_name, units)
    }

    pub fn register_typed_input<T: FromValue>(
        &self,
        key: &str,
        units: &str,
    ) -> Result<Input, FederateError> {
        self.shared.register_input(key, T::DATA_TYPE.name(), units)
    }

    /// Register an anonymous input subscribed to `target`.
    pub fn register_subscription(&self, target: &str, units: &str) -> Result<Input, FederateError> {
        let input = self.shared.register_input("", "", units)?;
        self.shared.add_input_target(input.handle(), target)?;
        Ok(input)
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    pub fn input(&self, key: &str) -> Option<Input> {
        let index = self.shared.inputs.index_of_name(key)?;
        self.shared.input_at(index)
    }

    pub fn input_at(&self, index: usize) -> Option<Input> {
        self.shared.input_at(index)
    }

    pub fn input_by_handle(&self, handle: InterfaceHandle) -> Option<Input> {
        let index = self.shared.inputs.index_of_handle(handle)?;
        self.shared.input_at(index)
    }

    /// First input subscribed to (or aliased as) `target`. Publications
    /// sending to `target` share the index and are skipped.
    pub fn input_by_target(&self, target: &str) -> Option<Input> {
        let handles = self.shared.target_ids.read().get(target)?.clone();
        handles
            .into_iter()
            .find_map(|handle| self.input_by_handle(handle))
    }

    pub fn publication(&self, key: &str) -> Option<Publication> {
        let index = self.shared.publications.index_of_name(key)?;
        self.shared.publication_at(index)
    }

    pub fn publication_at(&self, index: usize) -> Option<Publication> {
        self.shared.publication_at(index)
    }

    pub fn publication_by_handle(&self, handle: InterfaceHandle) -> Option<Publication> {
        let index = self.shared.publications.index_of_handle(handle)?;
        self.shared.publication_at(index)
    }

    pub fn input_count(&self) -> usize {
        self.shared.inputs.len()
    }

    pub fn publication_count(&self) -> usize {
        self.shared.publications.len()
    }

    /// First target of `input`, or an empty string.
    pub fn get_target(&self, input: &Input) -> Result<String, FederateError> {
        self.shared.input_index(input)?;
        Ok(self
            .shared
            .targets_of(input.handle())
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// `Startup -> Initializing`: resolve every input's source type and
    /// units.
    pub fn enter_initializing(&self) -> Result<(), FederateError> {
        self.shared.transition(FederateState::Initializing)?;
        self.shared.resolve_sources();
        Ok(())
    }

    /// `Initializing -> Executing` at the first granted time.
    pub fn enter_executing(&self, granted: Time) -> Result<(), FederateError> {
        self.shared.transition(FederateState::Executing)?;
        self.shared.update_time(granted);
        Ok(())
    }

    /// Apply every update the Core holds for this federate as of `new_time`.
    pub fn update_time(&self, new_time: Time) {
        self.shared.update_time(new_time);
    }

    pub fn finalize(&self) -> Result<(), FederateError> {
        self.shared.transition(FederateState::Finalized)
    }

    /// Route every further Core call to [`EmptyCore`]. Retained handles
    /// keep working but stop producing updates.
    pub fn disconnect(&self) {
        *self.shared.core.write() = Arc::new(EmptyCore);
        info!(fed = %self.shared.fed_id, "Value federate disconnected from core");
    }

    // =========================================================================
    // CALLBACKS & UPDATES
    // =========================================================================

    /// Callback for inputs without their own.
    pub fn set_input_notification_callback(
        &self,
        callback: impl Fn(&Input, Time) + Send + Sync + 'static,
    ) {
        *self.shared.all_callback.write() = Some(Arc::new(callback));
    }

    pub fn clear_input_notification_callback(&self) {
        *self.shared.all_callback.write() = None;
    }

    pub fn set_input_callback(
        &self,
        input: &Input,
        callback: impl Fn(&Input, Time) + Send + Sync + 'static,
    ) -> Result<(), FederateError> {
        let index = self.shared.input_index(input)?;
        self.shared.set_input_callback(index, Arc::new(callback))
    }

    pub fn clear_updates(&self) {
        self.shared.clear_updates();
    }

    pub fn clear_update(&self, input: &Input) -> Result<(), FederateError> {
        let index = self.shared.input_index(input)?;
        self.shared.clear_input_update(index)
    }

    /// Indices of inputs holding an unread update.
    pub fn query_updates(&self) -> Vec<usize> {
        self.shared.query_updates()
    }

    /// Answer an introspection query; unknown queries return `""`.
    pub fn local_query(&self, query: &str) -> String {
        self.shared.local_query(query)
    }
}
