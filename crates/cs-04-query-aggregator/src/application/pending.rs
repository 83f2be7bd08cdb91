//! Pending Fan-out Query Table.
//!
//! Tracks distributed queries whose answer is still being gathered from
//! other components. Each query owns a [`JsonMapBuilder`]; sub-answers fill
//! its placeholders until the document completes, the answering component
//! is cleared, or the query times out.

use crate::config::AggregatorConfig;
use crate::domain::errors::QueryError;
use crate::domain::map_builder::{JsonMapBuilder, PlaceholderToken};
use crate::domain::query_id::QueryId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A query removed from the table, with its generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedQuery {
    /// Id assigned at registration
    pub id: QueryId,

    /// Serialised JSON answer
    pub document: String,

    /// `false` when the query expired with placeholders still open
    pub complete: bool,

    /// Time between registration and completion
    pub elapsed: Duration,
}

struct PendingQuery {
    /// Document under assembly with its open placeholders
    builder: JsonMapBuilder,

    /// When the query was registered (for timeout)
    created_at: Instant,

    /// Deadline for this query, measured from `created_at`
    timeout: Duration,

    /// Free-form label used in log output
    description: String,
}

impl PendingQuery {
    fn finish(self, id: QueryId, complete: bool) -> CompletedQuery {
        CompletedQuery {
            id,
            document: self.builder.generate(),
            complete,
            elapsed: self.created_at.elapsed(),
        }
    }
}

/// Outcome of [`PendingQueryTable::register`].
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// Sub-answers are still expected.
    Pending(QueryId),
    /// Nothing was outstanding; the document is already final and the
    /// query was never tracked.
    Complete(CompletedQuery),
}

impl Registration {
    pub fn id(&self) -> QueryId {
        match self {
            Self::Pending(id) => *id,
            Self::Complete(query) => query.id,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Counters for the pending query table.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Queries handed to `register`, including ones complete on arrival
    pub total_registered: AtomicU64,

    /// Queries finished with every placeholder filled or cleared
    pub total_completed: AtomicU64,

    /// Queries finished by `remove_expired` with a partial answer
    pub total_timeouts: AtomicU64,

    /// Queries dropped through `cancel` without an answer
    pub total_cancelled: AtomicU64,
}

/// In-flight fan-out queries keyed by [`QueryId`].
pub struct PendingQueryTable {
    /// Pending queries by id
    pending: DashMap<QueryId, PendingQuery>,

    /// Timeout for queries registered without one
    default_timeout: Duration,

    /// Statistics
    stats: Arc<PendingStats>,
}

impl PendingQueryTable {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            default_timeout,
            stats: Arc::new(PendingStats::default()),
        }
    }

    pub fn from_config(config: &AggregatorConfig) -> Self {
        Self::new(config.pending_timeout())
    }

    /// Start tracking a query whose placeholders have already been
    /// generated on `builder`.
    ///
    /// A builder with no open placeholders completes immediately.
    pub fn register(
        &self,
        description: &str,
        builder: JsonMapBuilder,
        timeout: Option<Duration>,
    ) -> Registration {
        let id = QueryId::new();
        let outstanding = builder.outstanding();
        let query = PendingQuery {
            builder,
            created_at: Instant::now(),
            timeout: timeout.unwrap_or(self.default_timeout),
            description: description.to_string(),
        };
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        if outstanding == 0 {
            self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
            debug!(query_id = %id, description, "Fan-out query complete on registration");
            return Registration::Complete(query.finish(id, true));
        }

        self.pending.insert(id, query);
        debug!(query_id = %id, description, outstanding, "Registered fan-out query");
        Registration::Pending(id)
    }

    /// Deliver one sub-answer.
    ///
    /// Returns the finished query once its last placeholder is filled.
    pub fn add_sub_response(
        &self,
        id: QueryId,
        token: PlaceholderToken,
        answer: &str,
    ) -> Result<Option<CompletedQuery>, QueryError> {
        let done = {
            let mut entry = self
                .pending
                .get_mut(&id)
                .ok_or(QueryError::UnknownQuery(id))?;
            if !entry.builder.is_outstanding(token) {
                return Err(QueryError::UnknownToken { query: id, token });
            }
            entry.builder.add_component(answer, token)
        };
        debug!(query_id = %id, %token, done, "Sub-response received");
        Ok(if done { self.complete(id) } else { None })
    }

    /// Abort every placeholder tagged with `code`, typically because the
    /// component that would answer them became unreachable.
    pub fn clear_source(
        &self,
        id: QueryId,
        code: i32,
    ) -> Result<Option<CompletedQuery>, QueryError> {
        let remaining = {
            let mut entry = self
                .pending
                .get_mut(&id)
                .ok_or(QueryError::UnknownQuery(id))?;
            entry.builder.clear_components(code);
            entry.builder.outstanding()
        };
        debug!(query_id = %id, code, remaining, "Cleared sub-query source");
        Ok(if remaining == 0 { self.complete(id) } else { None })
    }

    fn complete(&self, id: QueryId) -> Option<CompletedQuery> {
        let (_, query) = self.pending.remove(&id)?;
        self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
        debug!(
            query_id = %id,
            description = query.description,
            elapsed_ms = query.created_at.elapsed().as_millis(),
            "Fan-out query complete"
        );
        Some(query.finish(id, true))
    }

    /// Complete every query past its timeout with whatever sub-answers
    /// arrived; open placeholders are dropped.
    pub fn remove_expired(&self) -> Vec<CompletedQuery> {
        let now = Instant::now();
        let expired: Vec<QueryId> = self
            .pending
            .iter()
            .filter(|entry| now.duration_since(entry.created_at) > entry.timeout)
            .map(|entry| *entry.key())
            .collect();

        let mut finished = Vec::with_capacity(expired.len());
        for id in expired {
            let Some((_, mut query)) = self.pending.remove(&id) else {
                continue;
            };
            warn!(
                query_id = %id,
                description = query.description,
                outstanding = query.builder.outstanding(),
                timeout_ms = query.timeout.as_millis(),
                "Fan-out query timed out; returning partial answer"
            );
            query.builder.clear_all_components();
            self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
            finished.push(query.finish(id, false));
        }
        finished
    }

    pub fn cancel(&self, id: &QueryId) -> bool {
        if self.pending.remove(id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: &QueryId) -> bool {
        self.pending.contains_key(id)
    }

    /// Placeholders still open on a query.
    pub fn outstanding(&self, id: &QueryId) -> Option<usize> {
        self.pending.get(id).map(|entry| entry.builder.outstanding())
    }

    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

/// Background task completing expired queries.
///
/// Partial answers are forwarded on `expired` when a receiver is attached.
pub async fn cleanup_task(
    table: Arc<PendingQueryTable>,
    interval: Duration,
    expired: Option<mpsc::UnboundedSender<CompletedQuery>>,
) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        let finished = table.remove_expired();
        if finished.is_empty() {
            continue;
        }
        debug!(removed = finished.len(), "Cleaned up expired fan-out queries");
        if let Some(tx) = &expired {
            for query in finished {
                if tx.send(query).is_err() {
                    break;
                }
            }
        }
    }
}
