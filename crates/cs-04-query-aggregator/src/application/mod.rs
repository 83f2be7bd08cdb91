//! Application layer: the pending fan-out query table.

pub mod pending;
