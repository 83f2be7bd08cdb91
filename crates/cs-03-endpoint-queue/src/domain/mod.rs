//! Domain layer for endpoint queues.

pub mod errors;
pub mod message;
pub mod queue;
