//! # Message Flow
//!
//! Endpoint delivery between federates: default destinations, time-ordered
//! retrieval, operator chains and bounded queues.

#[cfg(test)]
mod tests {
    use crate::harness::init_test_logging;
    use cs_03_endpoint_queue::{
        EndpointConfig, EndpointError, EndpointManager, Message, MessageConditionalOperator,
        MessageDataOperator, MessageTimeOperator, OperatorChain,
    };
    use shared_types::{FederateId, Time};

    fn secs(t: f64) -> Time {
        Time::from_secs_f64(t)
    }

    fn manager() -> EndpointManager {
        init_test_logging();
        let manager = EndpointManager::new(FederateId(0), EndpointConfig::default());
        manager.register_endpoint("controller", "").unwrap();
        manager.register_endpoint("breaker", "command").unwrap();
        manager
    }

    #[test]
    fn test_messages_released_in_time_order() {
        let m = manager();
        m.set_default_destination("controller", "breaker").unwrap();

        m.send("controller", "open", secs(3.0)).unwrap();
        m.send("controller", "close", secs(1.0)).unwrap();
        m.send("controller", "trip", secs(2.0)).unwrap();

        assert_eq!(m.pending_count("breaker", secs(2.0)).unwrap(), 2);
        assert_eq!(m.earliest_message_time(), secs(1.0));

        let first = m.get_message("breaker", secs(2.5)).unwrap().unwrap();
        let second = m.get_message("breaker", secs(2.5)).unwrap().unwrap();
        assert_eq!(first.payload_str(), "close");
        assert_eq!(second.payload_str(), "trip");
        assert!(m.get_message("breaker", secs(2.5)).unwrap().is_none());

        let last = m.get_any_message(Time::MAX).unwrap();
        assert_eq!(last.payload_str(), "open");
        assert_eq!(m.total_pending(Time::MAX), 0);
        assert_eq!(m.earliest_message_time(), Time::MAX);
    }

    #[test]
    fn test_operator_chain_rewrites_and_filters() {
        let m = manager();
        let chain = OperatorChain::new()
            .then(MessageConditionalOperator::new(|msg: &Message| !msg.is_empty()))
            .then(MessageDataOperator::new(|data: &[u8]| data.to_ascii_uppercase()))
            .then(MessageTimeOperator::new(|t: Time| {
                Time::from_nanos(t.as_nanos() + 500_000_000)
            }));
        m.set_operator("breaker", chain).unwrap();

        assert!(m
            .deliver(Message::new("controller", "breaker", "open", secs(1.0)))
            .unwrap());
        assert!(!m
            .deliver(Message::new("controller", "breaker", Vec::<u8>::new(), secs(1.0)))
            .unwrap());

        assert!(m.get_message("breaker", secs(1.0)).unwrap().is_none());
        let msg = m.get_message("breaker", secs(1.5)).unwrap().unwrap();
        assert_eq!(msg.payload_str(), "OPEN");
        assert_eq!(msg.time, secs(1.5));
        assert_eq!(msg.original_source, "controller");
    }

    #[test]
    fn test_equal_times_ordered_by_original_source() {
        let m = manager();
        m.register_endpoint("sink", "").unwrap();
        m.deliver(Message::new("zeta", "sink", "z", secs(1.0))).unwrap();
        m.deliver(Message::new("alpha", "sink", "a", secs(1.0))).unwrap();

        let order: Vec<String> = std::iter::from_fn(|| m.get_message("sink", secs(1.0)).unwrap())
            .map(|msg| msg.original_source)
            .collect();
        assert_eq!(order, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_bounded_queue_drops_overflow() {
        init_test_logging();
        let m = EndpointManager::new(FederateId(1), EndpointConfig::bounded(2));
        m.register_endpoint("sink", "").unwrap();
        for i in 0..3 {
            let accepted = m
                .deliver(Message::new("src", "sink", format!("m{i}"), secs(1.0)))
                .unwrap();
            assert_eq!(accepted, i < 2);
        }
        assert_eq!(m.pending_count("sink", Time::MAX).unwrap(), 2);
        m.clear("sink").unwrap();
        assert_eq!(m.pending_count("sink", Time::MAX).unwrap(), 0);
    }

    #[test]
    fn test_unknown_and_duplicate_endpoints() {
        let m = manager();
        assert!(matches!(
            m.register_endpoint("breaker", ""),
            Err(EndpointError::DuplicateEndpoint(_))
        ));
        assert!(matches!(
            m.deliver(Message::new("controller", "nowhere", "x", secs(1.0))),
            Err(EndpointError::UnknownEndpoint(_))
        ));
        assert_eq!(m.type_of("breaker").as_deref(), Some("command"));
        assert_eq!(m.endpoint_count(), 2);
    }
}
