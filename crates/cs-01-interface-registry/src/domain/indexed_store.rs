//! # Indexed Store
//!
//! Insertion-ordered vector with two secondary indices.
//!
//! ## Data Structures
//!
//! - `entries`: records in registration order (the index is stable)
//! - `by_name`: O(1) lookup by search key or alias
//! - `by_handle`: O(1) lookup by Core handle
//!
//! Lookups return `Option`; absence is the "not found" sentinel.

use shared_types::{FederateId, InterfaceHandle};
use std::collections::HashMap;

/// A record together with the identity it was registered under.
#[derive(Debug, Clone)]
struct Slot<T> {
    handle: InterfaceHandle,
    owner: FederateId,
    record: T,
}

/// Unlocked storage behind [`crate::InterfaceRegistry`].
#[derive(Debug, Clone)]
pub struct IndexedStore<T> {
    entries: Vec<Slot<T>>,
    by_name: HashMap<String, usize>,
    by_handle: HashMap<InterfaceHandle, usize>,
}

impl<T> Default for IndexedStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_handle: HashMap::new(),
        }
    }
}

impl<T> IndexedStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a record.
    ///
    /// An empty `key` registers the record without a search term. Returns
    /// `None` if the key (or the handle) is already present.
    pub fn insert(
        &mut self,
        key: &str,
        handle: InterfaceHandle,
        owner: FederateId,
        record: T,
    ) -> Option<usize> {
        if !key.is_empty() && self.by_name.contains_key(key) {
            return None;
        }
        if handle.is_valid() && self.by_handle.contains_key(&handle) {
            return None;
        }

        let index = self.entries.len();
        self.entries.push(Slot {
            handle,
            owner,
            record,
        });
        if !key.is_empty() {
            self.by_name.insert(key.to_string(), index);
        }
        if handle.is_valid() {
            self.by_handle.insert(handle, index);
        }
        Some(index)
    }

    /// Map an additional name onto an existing record.
    ///
    /// Returns `false` if the handle is unknown or the name is already taken.
    pub fn add_search_term(&mut self, alias: &str, handle: InterfaceHandle) -> bool {
        if alias.is_empty() || self.by_name.contains_key(alias) {
            return false;
        }
        match self.by_handle.get(&handle) {
            Some(&index) => {
                self.by_name.insert(alias.to_string(), index);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    pub fn index_of_name(&self, key: &str) -> Option<usize> {
        self.by_name.get(key).copied()
    }

    pub fn index_of_handle(&self, handle: InterfaceHandle) -> Option<usize> {
        self.by_handle.get(&handle).copied()
    }

    pub fn find_name(&self, key: &str) -> Option<&T> {
        self.index_of_name(key).and_then(|i| self.get(i))
    }

    pub fn find_handle(&self, handle: InterfaceHandle) -> Option<&T> {
        self.index_of_handle(handle).and_then(|i| self.get(i))
    }

    pub fn find_name_mut(&mut self, key: &str) -> Option<&mut T> {
        let index = self.index_of_name(key)?;
        self.get_mut(index)
    }

    pub fn find_handle_mut(&mut self, handle: InterfaceHandle) -> Option<&mut T> {
        let index = self.index_of_handle(handle)?;
        self.get_mut(index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|slot| &slot.record)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|slot| &mut slot.record)
    }

    pub fn handle_at(&self, index: usize) -> Option<InterfaceHandle> {
        self.entries.get(index).map(|slot| slot.handle)
    }

    pub fn owner_at(&self, index: usize) -> Option<FederateId> {
        self.entries.get(index).map(|slot| slot.owner)
    }

    /// All search terms (names and aliases) currently mapped.
    pub fn search_terms(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    // =========================================================================
    // ITERATION
    // =========================================================================

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|slot| &slot.record)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|slot| &mut slot.record)
    }

    /// Apply `f` to every record in registration order.
    pub fn apply<F: FnMut(&mut T)>(&mut self, mut f: F) {
        for slot in &mut self.entries {
            f(&mut slot.record);
        }
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.last().map(|slot| &slot.record)
    }
}
