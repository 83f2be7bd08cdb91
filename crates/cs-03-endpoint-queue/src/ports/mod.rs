//! Ports for the endpoint queue.

pub mod operator;
