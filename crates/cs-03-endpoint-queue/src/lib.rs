//! # CS-03: Endpoint Message Queue
//!
//! Message-passing counterpart of value exchange. Every message is kept
//! individually and delivered in full time order; nothing is coalesced.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | queue sorted by `(time, original_source)` | `EndpointQueue::add_message` re-sorts |
//! | nothing dequeued past the requested time | `get_message(max_time)` |
//! | empty queue reports the maximum time | `first_message_time` |
//! | access to one queue is serialised | per-endpoint mutex in `EndpointManager` |
//!
//! [`EndpointQueue`] itself is not thread-safe; [`EndpointManager`] owns the
//! queues and locks each one independently.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::operators::{
    MessageConditionalOperator, MessageDataOperator, MessageTimeOperator, OperatorChain,
};
pub use application::manager::EndpointManager;
pub use config::EndpointConfig;
pub use domain::errors::EndpointError;
pub use domain::message::Message;
pub use domain::queue::EndpointQueue;
pub use ports::operator::MessageOperator;
