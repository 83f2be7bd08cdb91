//! # Value Exchange Flow
//!
//! Several federates sharing one in-memory Core: registration, lifecycle,
//! unit conversion across federates, multi-source combination, JSON
//! encoding, concurrent publishing and disconnect.

#[cfg(test)]
mod tests {
    use crate::harness::init_test_logging;
    use cs_02_value_exchange::{
        InMemoryCore, MultiInputMode, ValueFederateConfig, ValueFederateManager,
    };
    use parking_lot::Mutex;
    use shared_types::{DataType, FederateError, Time};
    use std::sync::Arc;
    use std::thread;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn federate(core: &Arc<InMemoryCore>, name: &str) -> ValueFederateManager {
        federate_with(core, name, ValueFederateConfig::default())
    }

    fn federate_with(
        core: &Arc<InMemoryCore>,
        name: &str,
        config: ValueFederateConfig,
    ) -> ValueFederateManager {
        init_test_logging();
        let fed = core.register_federate(name);
        ValueFederateManager::new(core.clone(), fed, config)
    }

    fn start(feds: &[&ValueFederateManager]) {
        for fed in feds {
            fed.enter_initializing().unwrap();
        }
        for fed in feds {
            fed.enter_executing(Time::ZERO).unwrap();
        }
    }

    fn secs(t: f64) -> Time {
        Time::from_secs_f64(t)
    }

    // =========================================================================
    // TESTS
    // =========================================================================

    #[test]
    fn test_units_converted_between_federates() {
        let core = Arc::new(InMemoryCore::new());
        let generator = federate(&core, "generator");
        let load = federate(&core, "load");

        let output = generator
            .register_publication("gen/output", "double", "kW")
            .unwrap();
        let demand = load.register_input("load/demand", "double", "W").unwrap();
        demand.add_target("gen/output").unwrap();
        start(&[&generator, &load]);

        assert_eq!(demand.injection_units().unwrap(), "kW");

        output.publish(2.5).unwrap();
        load.update_time(secs(1.0));
        assert!(demand.is_updated());
        assert_eq!(demand.get_value::<f64>().unwrap(), 2500.0);
    }

    #[test]
    fn test_max_over_sources_from_several_federates() {
        let core = Arc::new(InMemoryCore::new());
        let sensors: Vec<ValueFederateManager> = (0..3)
            .map(|i| federate(&core, &format!("sensor{i}")))
            .collect();
        let monitor = federate(&core, "monitor");

        let publications: Vec<_> = sensors
            .iter()
            .enumerate()
            .map(|(i, fed)| {
                fed.register_publication(&format!("temp{i}"), "double", "")
                    .unwrap()
            })
            .collect();
        let peak = monitor.register_input("peak", "double", "").unwrap();
        peak.set_multi_input_mode(MultiInputMode::Max).unwrap();
        for i in 0..3 {
            peak.add_target(&format!("temp{i}")).unwrap();
        }

        for (publication, value) in publications.iter().zip([21.0, 35.5, 28.0]) {
            publication.publish(value).unwrap();
        }
        monitor.update_time(secs(1.0));
        assert_eq!(peak.get_value::<f64>().unwrap(), 35.5);

        publications[1].publish(10.0).unwrap();
        monitor.update_time(secs(2.0));
        assert_eq!(peak.get_value::<f64>().unwrap(), 28.0);
    }

    #[test]
    fn test_json_encoded_federation() {
        let core = Arc::new(InMemoryCore::new());
        let a = federate_with(&core, "a", ValueFederateConfig::json());
        let b = federate_with(&core, "b", ValueFederateConfig::json());

        let publication = a.register_publication("x", "double", "").unwrap();
        let input = b.register_input("y", "double", "").unwrap();
        assert_eq!(publication.type_name().unwrap(), "json");
        assert_eq!(input.data_type().unwrap(), DataType::Unknown);
        input.add_target("x").unwrap();
        start(&[&a, &b]);

        publication.publish(3.5).unwrap();
        b.update_time(secs(1.0));
        assert_eq!(input.get_value::<f64>().unwrap(), 3.5);

        let raw = input.get_raw().unwrap();
        let text = std::str::from_utf8(&raw).unwrap();
        assert!(text.contains("3.5"));
    }

    #[test]
    fn test_concurrent_publisher_and_time_advance() {
        let core = Arc::new(InMemoryCore::new());
        let producer = federate(&core, "producer");
        let consumer = Arc::new(federate(&core, "consumer"));

        let counter = producer.register_publication("count", "int64", "").unwrap();
        let input = consumer.register_input("count_in", "int64", "").unwrap();
        input.add_target("count").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        input
            .set_value_callback::<i64>(move |v, _| log.lock().push(v))
            .unwrap();

        thread::scope(|scope| {
            scope.spawn(|| {
                for i in 1..=200_i64 {
                    counter.publish(i).unwrap();
                }
            });
            let consumer = Arc::clone(&consumer);
            scope.spawn(move || {
                for step in 0..200 {
                    consumer.update_time(Time::from_nanos(step));
                }
            });
        });
        consumer.update_time(secs(1.0));

        assert_eq!(input.get_value::<i64>().unwrap(), 200);
        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&200));
    }

    #[test]
    fn test_disconnect_stops_updates_but_keeps_reads() {
        let core = Arc::new(InMemoryCore::new());
        let source = federate(&core, "source");
        let sink = federate(&core, "sink");

        let publication = source.register_publication("s", "string", "").unwrap();
        let input = sink.register_subscription("s", "").unwrap();
        start(&[&source, &sink]);

        publication.publish("before").unwrap();
        sink.update_time(secs(1.0));
        assert_eq!(input.get_value::<String>().unwrap(), "before");

        sink.disconnect();
        publication.publish("after").unwrap();
        sink.update_time(secs(2.0));
        assert!(!input.is_updated());
        assert_eq!(input.get_value::<String>().unwrap(), "before");
        assert!(matches!(
            sink.register_publication("late", "double", ""),
            Err(FederateError::RegistrationFailure(_))
        ));
    }

    #[test]
    fn test_values_query_spans_typed_inputs() {
        let core = Arc::new(InMemoryCore::new());
        let source = federate(&core, "source");
        let sink = federate(&core, "sink");

        let vector = source.register_publication("v", "vector", "").unwrap();
        let flag = source.register_publication("f", "bool", "").unwrap();
        sink.register_subscription("v", "").unwrap();
        sink.register_subscription("f", "").unwrap();
        start(&[&source, &sink]);

        vector.publish(vec![1.0, 2.0]).unwrap();
        flag.publish(true).unwrap();
        sink.update_time(secs(1.0));

        let values: serde_json::Value =
            serde_json::from_str(&sink.local_query("values")).unwrap();
        assert_eq!(values, serde_json::json!({ "v": [1.0, 2.0], "f": "true" }));
    }
}
