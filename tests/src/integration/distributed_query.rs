//! # Distributed Query
//!
//! A federation-wide `values` query: one placeholder per federate, filled
//! from each federate's local answer as it arrives. Covers completion,
//! unreachable federates, malformed answers and timeouts.

#[cfg(test)]
mod tests {
    use crate::harness::init_test_logging;
    use cs_02_value_exchange::{InMemoryCore, ValueFederateConfig, ValueFederateManager};
    use cs_04_query_aggregator::{
        cleanup_task, JsonMapBuilder, PendingQueryTable, PlaceholderToken, INVALID_ANSWER,
    };
    use serde_json::json;
    use shared_types::Time;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct Federation {
        core: Arc<InMemoryCore>,
        feds: Vec<ValueFederateManager>,
    }

    /// Three federates: `fed0` publishes, the other two subscribe.
    fn federation() -> Federation {
        init_test_logging();
        let core = Arc::new(InMemoryCore::new());
        let feds: Vec<ValueFederateManager> = (0..3)
            .map(|i| {
                let id = core.register_federate(&format!("fed{i}"));
                ValueFederateManager::new(core.clone(), id, ValueFederateConfig::default())
            })
            .collect();

        let publication = feds[0].register_publication("freq", "double", "Hz").unwrap();
        feds[1].register_input("f1", "double", "Hz").unwrap().add_target("freq").unwrap();
        feds[2].register_input("f2", "double", "Hz").unwrap().add_target("freq").unwrap();
        publication.publish(60.0).unwrap();
        for fed in &feds {
            fed.update_time(Time::from_secs_f64(1.0));
        }
        Federation { core, feds }
    }

    fn fan_out(count: usize) -> (JsonMapBuilder, Vec<PlaceholderToken>) {
        let mut builder = JsonMapBuilder::new();
        builder.document_mut()["query"] = json!("values");
        let tokens = (0..count)
            .map(|code| builder.generate_placeholder("federates", code as i32))
            .collect();
        (builder, tokens)
    }

    #[test]
    fn test_query_completes_when_every_federate_answers() {
        let federation = federation();
        let table = PendingQueryTable::new(Duration::from_secs(30));
        let (builder, tokens) = fan_out(federation.feds.len());
        let id = table.register("values", builder, None).id();

        let mut completed = None;
        for (fed, token) in federation.feds.iter().zip(&tokens) {
            assert!(completed.is_none());
            completed = table
                .add_sub_response(id, *token, &fed.local_query("values"))
                .unwrap();
        }

        let completed = completed.unwrap();
        assert!(completed.complete);
        let document: serde_json::Value = serde_json::from_str(&completed.document).unwrap();
        assert_eq!(
            document,
            json!({
                "query": "values",
                "federates": [{}, { "f1": 60.0 }, { "f2": 60.0 }],
            })
        );
        assert!(!table.is_pending(&id));
        assert_eq!(table.stats().total_completed.load(Ordering::Relaxed), 1);
        assert_eq!(federation.core.interface_count(), 3);
    }

    #[test]
    fn test_unreachable_federate_is_cleared() {
        let federation = federation();
        let table = PendingQueryTable::new(Duration::from_secs(30));
        let (builder, tokens) = fan_out(3);
        let id = table.register("values", builder, None).id();

        table
            .add_sub_response(id, tokens[1], &federation.feds[1].local_query("values"))
            .unwrap();
        table.add_sub_response(id, tokens[2], INVALID_ANSWER).unwrap();
        assert_eq!(table.outstanding(&id), Some(1));

        let completed = table.clear_source(id, 0).unwrap().unwrap();
        let document: serde_json::Value = serde_json::from_str(&completed.document).unwrap();
        assert_eq!(document["federates"], json!([{ "f1": 60.0 }, {}]));
    }

    #[test]
    fn test_answer_for_retired_token_is_rejected() {
        let table = PendingQueryTable::new(Duration::from_secs(30));
        let (builder, tokens) = fan_out(2);
        let id = table.register("values", builder, None).id();

        table.add_sub_response(id, tokens[0], "{}").unwrap();
        assert!(table.add_sub_response(id, tokens[0], "{}").is_err());
        assert!(table.cancel(&id));
        assert!(table.add_sub_response(id, tokens[1], "{}").is_err());
    }

    #[tokio::test]
    async fn test_expired_query_returns_partial_answer() {
        let federation = federation();
        let table = Arc::new(PendingQueryTable::new(Duration::from_secs(30)));
        let (builder, tokens) = fan_out(3);
        let id = table.register("values", builder, Some(Duration::from_millis(20))).id();
        table
            .add_sub_response(id, tokens[2], &federation.feds[2].local_query("values"))
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let cleaner = tokio::spawn(cleanup_task(
            Arc::clone(&table),
            Duration::from_millis(5),
            Some(tx),
        ));

        let expired = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timeout waiting for expiry")
            .expect("cleanup task dropped the sender");
        cleaner.abort();

        assert_eq!(expired.id, id);
        assert!(!expired.complete);
        let document: serde_json::Value = serde_json::from_str(&expired.document).unwrap();
        assert_eq!(document["federates"], json!([{ "f2": 60.0 }]));
        assert_eq!(table.pending_count(), 0);
        assert_eq!(table.stats().total_timeouts.load(Ordering::Relaxed), 1);
    }
}
