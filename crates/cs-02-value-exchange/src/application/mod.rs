//! Application layer: the value federate manager and its interface handles.

pub mod input;
pub mod manager;
pub mod publication;
mod query;
mod runtime;
