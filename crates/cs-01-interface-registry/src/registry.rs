//! # Interface Registry
//!
//! Reader/writer-locked wrapper around [`IndexedStore`]. Reads share the
//! lock; inserts, alias additions and `apply` hold it exclusively.

use crate::domain::indexed_store::IndexedStore;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use shared_types::{FederateId, InterfaceHandle};
use tracing::{debug, warn};

/// Concurrent registry of interface records of one kind.
#[derive(Debug)]
pub struct InterfaceRegistry<T> {
    kind: &'static str,
    store: RwLock<IndexedStore<T>>,
}

impl<T> InterfaceRegistry<T> {
    /// Create an empty registry; `kind` names the record type in log output.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            store: RwLock::new(IndexedStore::new()),
        }
    }

    /// Shared access for multi-step reads.
    pub fn read(&self) -> RwLockReadGuard<'_, IndexedStore<T>> {
        self.store.read()
    }

    /// Exclusive access for multi-step updates.
    pub fn write(&self) -> RwLockWriteGuard<'_, IndexedStore<T>> {
        self.store.write()
    }

    /// Insert a record; `None` signals a duplicate name.
    pub fn insert(
        &self,
        key: &str,
        handle: InterfaceHandle,
        owner: FederateId,
        record: T,
    ) -> Option<usize> {
        let inserted = self.store.write().insert(key, handle, owner, record);
        match inserted {
            Some(index) => {
                debug!(kind = self.kind, key, %handle, index, "Registered interface");
            }
            None => {
                warn!(kind = self.kind, key, %handle, "Duplicate interface registration rejected");
            }
        }
        inserted
    }

    /// Map an alias onto the record registered under `handle`.
    pub fn add_search_term(&self, alias: &str, handle: InterfaceHandle) -> bool {
        let added = self.store.write().add_search_term(alias, handle);
        if added {
            debug!(kind = self.kind, alias, %handle, "Added search term");
        }
        added
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    pub fn index_of_name(&self, key: &str) -> Option<usize> {
        self.store.read().index_of_name(key)
    }

    pub fn index_of_handle(&self, handle: InterfaceHandle) -> Option<usize> {
        self.store.read().index_of_handle(handle)
    }

    pub fn handle_at(&self, index: usize) -> Option<InterfaceHandle> {
        self.store.read().handle_at(index)
    }

    // =========================================================================
    // CLOSURE ACCESS
    // =========================================================================

    pub fn with_name<R>(&self, key: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.store.read().find_name(key).map(f)
    }

    pub fn with_handle<R>(&self, handle: InterfaceHandle, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.store.read().find_handle(handle).map(f)
    }

    pub fn with_index<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.store.read().get(index).map(f)
    }

    pub fn modify_handle<R>(
        &self,
        handle: InterfaceHandle,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        self.store.write().find_handle_mut(handle).map(f)
    }

    pub fn modify_index<R>(&self, index: usize, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.store.write().get_mut(index).map(f)
    }

    /// Apply `f` to every record while holding the exclusive lock.
    pub fn apply<F: FnMut(&mut T)>(&self, f: F) {
        self.store.write().apply(f);
    }
}

impl<T: Clone> InterfaceRegistry<T> {
    /// Copy of every record in registration order.
    pub fn snapshot(&self) -> Vec<T> {
        self.store.read().iter().cloned().collect()
    }
}
