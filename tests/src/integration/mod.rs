//! Cross-crate integration flows.

pub mod distributed_query;
pub mod message_flow;
pub mod value_exchange_flow;
