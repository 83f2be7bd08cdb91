//! Adapters implementing the outbound ports.

pub mod empty_core;
pub mod in_memory_core;
pub mod units;
