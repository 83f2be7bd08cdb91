//! # CS-04: Fan-out Query Aggregator
//!
//! Builds structured query answers incrementally.
//!
//! ## Components
//!
//! | Type | Role |
//! |------|------|
//! | [`JsonBuilder`] | single pass: set path keys to scalars or vectors |
//! | [`JsonMapBuilder`] | placeholder slots filled by asynchronous sub-answers |
//! | [`PendingQueryTable`] | in-flight fan-out queries keyed by [`QueryId`], with timeouts |
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | complete iff document exists and no placeholders remain | `JsonMapBuilder::is_completed` |
//! | malformed sub-answer never aborts the document | `add_component` installs `{}` |
//! | unknown abort code is a no-op | `clear_components` |
//! | orphaned placeholders expire | `PendingQueryTable::remove_expired` |
//!
//! ## Flow
//!
//! ```text
//! register(builder) ──► QueryId
//!        │
//!        ├── add_sub_response(id, token, answer) ──► Some(document) when complete
//!        ├── clear_source(id, code)               ──► Some(document) when complete
//!        └── remove_expired()                     ──► partial documents of timed-out queries
//! ```

pub mod application;
pub mod config;
pub mod domain;

pub use application::pending::{
    cleanup_task, CompletedQuery, PendingQueryTable, PendingStats, Registration,
};
pub use config::AggregatorConfig;
pub use domain::errors::QueryError;
pub use domain::json_builder::{split_path, JsonBuilder};
pub use domain::map_builder::{JsonMapBuilder, PlaceholderToken, INVALID_ANSWER};
pub use domain::query_id::QueryId;
