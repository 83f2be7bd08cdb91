//! Application layer: the endpoint manager.

pub mod manager;
