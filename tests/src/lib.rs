//! # Co-Simulation Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks
//! ├── src/harness.rs    # Shared logging setup
//! └── src/integration/  # Cross-crate flows
//!     ├── value_exchange_flow.rs
//!     ├── message_flow.rs
//!     └── distributed_query.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cs-tests
//! cargo test -p cs-tests integration::value_exchange_flow
//! cargo bench -p cs-tests
//! ```

#![allow(dead_code)]

pub mod harness;
pub mod integration;
