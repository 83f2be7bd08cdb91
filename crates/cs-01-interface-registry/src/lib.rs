//! # Interface Registry
//!
//! Concurrent, insertion-ordered store of interface records, searchable by
//! name (plus aliases), by Core handle, and by insertion index.
//!
//! ## Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Non-empty search keys are unique | `domain/indexed_store.rs` - `insert()` |
//! | INVARIANT-2 | Records are never removed individually | no removal API |
//! | INVARIANT-3 | Aliases resolve to an existing record | `add_search_term()` checks the handle |
//! | INVARIANT-4 | Arena slots never move once issued | `domain/arena.rs` - append-only |
//!
//! ## Locking
//!
//! ```text
//! InterfaceRegistry<T>  ── RwLock ──▶ IndexedStore<T>   (shared reads, exclusive writes)
//! RecordArena<T>        ── Mutex  ──▶ Vec<T>            (independent of the registry lock)
//! ```
//!
//! Operations touching both containers take each lock separately; nothing
//! here ever nests them.

pub mod domain;
pub mod registry;

pub use domain::arena::{ArenaIndex, RecordArena};
pub use domain::indexed_store::IndexedStore;
pub use registry::InterfaceRegistry;
