//! Built-in message operators.

pub mod operators;
