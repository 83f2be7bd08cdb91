//! # CS-02: Value Exchange
//!
//! Typed value interfaces for one federate and the manager that applies
//! inbound updates at time-advance boundaries.
//!
//! ## Architecture
//!
//! - **Domain**: interface records, change detection, multi-input combination,
//!   lifecycle states, typed extraction ([`FromValue`])
//! - **Ports**: [`Core`] (routing collaborator) and [`UnitConverter`]
//! - **Adapters**: [`EmptyCore`] (post-disconnect stand-in), [`InMemoryCore`]
//!   (loopback broker), [`IdentityUnits`]
//! - **Application**: [`ValueFederateManager`] and the [`Input`] /
//!   [`Publication`] handles it hands out
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | handle invalid until registration succeeds | `Input::default()` carries the invalid sentinel |
//! | duplicate names fail registration | `InterfaceRegistry::insert` returns `None` |
//! | no lock held while a user callback runs | `update_time` releases every guard before dispatch |
//! | one bad handle never aborts a time step | per-handle errors are logged and skipped |
//! | runtime state addressed by index | `InputData` lives in a `RecordArena` |
//!
//! ## Locking
//!
//! ```text
//! inputs registry ─┐
//! publications    ─┤  each guarded independently; never nested,
//! input_data arena─┤  acquired and released one at a time
//! target maps     ─┤
//! default callback─┘  cloned out of its lock before it is invoked
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::empty_core::EmptyCore;
pub use adapters::in_memory_core::InMemoryCore;
pub use adapters::units::IdentityUnits;
pub use application::input::Input;
pub use application::manager::{InputCallback, ValueFederateManager};
pub use application::publication::Publication;
pub use config::ValueFederateConfig;
pub use domain::multi_input::MultiInputMode;
pub use domain::state::FederateState;
pub use domain::value_type::FromValue;
pub use ports::outbound::{Core, UnitConverter};
