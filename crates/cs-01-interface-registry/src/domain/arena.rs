//! # Record Arena
//!
//! Append-only container for mutable runtime state. Records refer to their
//! slot by [`ArenaIndex`] instead of by address, so a slot stays reachable
//! however the owning registry reallocates.

use parking_lot::Mutex;

/// Stable position of a record in a [`RecordArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaIndex(usize);

impl ArenaIndex {
    pub const fn value(self) -> usize {
        self.0
    }
}

/// Independently locked, slot-stable storage.
#[derive(Debug)]
pub struct RecordArena<T> {
    slots: Mutex<Vec<T>>,
}

impl<T> Default for RecordArena<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }
}

impl<T> RecordArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: T) -> ArenaIndex {
        let mut slots = self.slots.lock();
        slots.push(value);
        ArenaIndex(slots.len() - 1)
    }

    /// Read a slot under the arena lock.
    pub fn with<R>(&self, index: ArenaIndex, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.slots.lock().get(index.0).map(f)
    }

    /// Mutate a slot under the arena lock.
    pub fn with_mut<R>(&self, index: ArenaIndex, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.slots.lock().get_mut(index.0).map(f)
    }

    /// Mutate every slot under one lock acquisition.
    pub fn for_each_mut(&self, mut f: impl FnMut(&mut T)) {
        for slot in self.slots.lock().iter_mut() {
            f(slot);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
