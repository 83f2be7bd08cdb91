//! # Co-Simulation Exchange Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | cs-01 Interface Registry | name and handle lookup |
//! | cs-02 Value Exchange | publish + time advance across federates |
//! | cs-03 Endpoint Queue | ordered insert and drain |
//! | cs-04 Query Aggregator | placeholder fill |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cs_01_interface_registry::InterfaceRegistry;
use cs_02_value_exchange::{InMemoryCore, ValueFederateConfig, ValueFederateManager};
use cs_03_endpoint_queue::{EndpointQueue, Message};
use cs_04_query_aggregator::JsonMapBuilder;
use shared_types::{FederateId, InterfaceHandle, Time};
use std::sync::Arc;

// ============================================================================
// CS-01: Interface Registry
// ============================================================================

fn bench_registry_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-01-interface-registry");

    for size in [100, 1_000, 10_000] {
        let registry = InterfaceRegistry::new("input");
        for i in 0..size {
            registry.insert(&format!("fed/input{i}"), InterfaceHandle::new(i), FederateId(0), i);
        }
        let key = format!("fed/input{}", size / 2);

        group.bench_with_input(BenchmarkId::new("lookup_by_name", size), &key, |b, key| {
            b.iter(|| black_box(registry.with_name(key, |v| *v)))
        });
        group.bench_with_input(
            BenchmarkId::new("lookup_by_handle", size),
            &InterfaceHandle::new(size / 2),
            |b, handle| b.iter(|| black_box(registry.with_handle(*handle, |v| *v))),
        );
    }
    group.finish();
}

// ============================================================================
// CS-02: Value Exchange
// ============================================================================

fn bench_publish_and_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-02-value-exchange");

    for inputs in [1, 10, 100] {
        let core = Arc::new(InMemoryCore::new());
        let sender = ValueFederateManager::new(
            core.clone(),
            core.register_federate("sender"),
            ValueFederateConfig::default(),
        );
        let receiver = ValueFederateManager::new(
            core.clone(),
            core.register_federate("receiver"),
            ValueFederateConfig::default(),
        );
        let publications: Vec<_> = (0..inputs)
            .map(|i| {
                let publication = sender
                    .register_publication(&format!("p{i}"), "double", "")
                    .unwrap();
                receiver
                    .register_input(&format!("i{i}"), "double", "")
                    .unwrap()
                    .add_target(&format!("p{i}"))
                    .unwrap();
                publication
            })
            .collect();

        let mut step = 0_i64;
        group.throughput(Throughput::Elements(inputs as u64));
        group.bench_function(BenchmarkId::new("publish_update_time", inputs), |b| {
            b.iter(|| {
                step += 1;
                for publication in &publications {
                    publication.publish(step as f64).unwrap();
                }
                receiver.update_time(Time::from_nanos(step));
            })
        });
    }
    group.finish();
}

// ============================================================================
// CS-03: Endpoint Queue
// ============================================================================

fn bench_queue_insert_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-03-endpoint-queue");

    for size in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert_drain", size), &size, |b, &size| {
            b.iter(|| {
                let mut queue = EndpointQueue::new();
                for i in 0..size {
                    let time = Time::from_nanos(((i * 7919) % size) as i64);
                    queue.add_message(Message::new("src", "dst", vec![0u8; 8], time));
                }
                let mut drained = 0;
                while queue.get_message(Time::MAX).is_some() {
                    drained += 1;
                }
                black_box(drained)
            })
        });
    }
    group.finish();
}

// ============================================================================
// CS-04: Query Aggregator
// ============================================================================

fn bench_placeholder_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-04-query-aggregator");

    for federates in [4, 32, 256] {
        group.bench_with_input(
            BenchmarkId::new("fill_placeholders", federates),
            &federates,
            |b, &federates| {
                b.iter(|| {
                    let mut builder = JsonMapBuilder::new();
                    let tokens: Vec<_> = (0..federates)
                        .map(|code| builder.generate_placeholder("feds", code))
                        .collect();
                    for token in tokens {
                        builder.add_component(r#"{"name":"fed","state":"executing"}"#, token);
                    }
                    black_box(builder.generate())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_registry_lookup,
    bench_publish_and_update,
    bench_queue_insert_drain,
    bench_placeholder_fill
);
criterion_main!(benches);
