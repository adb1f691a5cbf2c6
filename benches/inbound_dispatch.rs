//! Inbound frame benchmark suite.
//!
//! Measures the per-frame cost of the receive path:
//! - Envelope decode, well-formed and malformed
//! - Manager dispatch to subscribers, at different subscriber counts
//!
//! Run with: cargo bench --bench inbound_dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::time::Duration;

use akasys_client::transport::{Channel, TransportEvent, TransportFactory};
use akasys_client::{Clock, ConnectionManager, Epoch, InboundMessage, Result, RetryPolicy, TimerId};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use url::Url;

// ============================================================================
// Fixtures
// ============================================================================

const REPLY: &str = r#"{"pergunta_original":"Qual o horário de atendimento?","match_intencao":"horario","answer":"Atendemos de segunda a sexta, das 8h às 18h."}"#;
const MALFORMED: &str = r#"{"pergunta_original":"Oi","match_intencao":null}"#;

const SUBSCRIBER_COUNTS: &[usize] = &[1, 4, 16];

struct NullFactory;

struct NullChannel;

impl TransportFactory for NullFactory {
    type Channel = NullChannel;

    fn open(&mut self, _url: &Url, _epoch: Epoch) -> Result<NullChannel> {
        Ok(NullChannel)
    }
}

impl Channel for NullChannel {
    fn send_text(&mut self, _text: String) {}

    fn close(&mut self) {}
}

struct NullClock;

impl Clock for NullClock {
    fn schedule(&mut self, _timer: TimerId, _delay: Duration) {}

    fn cancel(&mut self, _timer: TimerId) {}
}

fn connected_manager(subscribers: usize) -> ConnectionManager<NullFactory, NullClock> {
    let mut manager = ConnectionManager::new(NullFactory, NullClock, RetryPolicy::default());
    for _ in 0..subscribers {
        manager.subscribe(|event| {
            black_box(event);
        });
    }

    let url = Url::parse("ws://localhost:8000/wb/chatbot").expect("url");
    manager.connect(url);
    let epoch = manager.epoch();
    manager.handle_transport_event(epoch, TransportEvent::Opened);
    manager
}

// ============================================================================
// Benchmark: Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(REPLY.len() as u64));

    group.bench_function("reply", |b| {
        b.iter(|| InboundMessage::decode(black_box(REPLY)));
    });

    group.bench_function("missing_answer", |b| {
        b.iter(|| InboundMessage::decode(black_box(MALFORMED)));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    for &count in SUBSCRIBER_COUNTS {
        let mut manager = connected_manager(count);
        let epoch = manager.epoch();

        group.bench_with_input(BenchmarkId::new("subscribers", count), &count, |b, _| {
            b.iter(|| {
                manager.handle_transport_event(epoch, TransportEvent::Message(REPLY.to_string()));
            });
        });
    }

    group.bench_function("stale_epoch", |b| {
        let mut manager = connected_manager(1);
        let stale = Epoch::new(0);
        b.iter(|| {
            manager.handle_transport_event(stale, TransportEvent::Message(REPLY.to_string()));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_dispatch);
criterion_main!(benches);
