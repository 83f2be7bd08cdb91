//! Domain layer for the query aggregator.

pub mod errors;
pub mod json_builder;
pub mod map_builder;
pub mod query_id;
