//! Domain layer: the unlocked indexed store and the slot-stable arena.

pub mod arena;
pub mod indexed_store;
