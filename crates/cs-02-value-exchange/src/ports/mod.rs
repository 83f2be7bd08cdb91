//! Ports for value exchange.

pub mod outbound;
