//! Error types for the query aggregator.

use crate::domain::map_builder::PlaceholderToken;
use crate::domain::query_id::QueryId;
use thiserror::Error;

/// Errors from the pending query table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No in-flight query with this id (completed, expired or never registered).
    #[error("Unknown query: {0}")]
    UnknownQuery(QueryId),

    /// The placeholder token is not outstanding on this query.
    #[error("Unknown placeholder token {token} for query {query}")]
    UnknownToken {
        query: QueryId,
        token: PlaceholderToken,
    },
}
