//! # Contact Book Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `broadcast_transition` | Pure fan-out over books of growing size |
//! | `codec` | Body decoding per message kind |
//! | `service_broadcast` | Full load → commit → settle cycle on the sandbox ledger |

use cb_tests::sandbox::{coins, random_addresses, Sandbox};
use contact_book::codec;
use contact_book::domain::services;
use contact_book::prelude::*;
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};

const SIZES: [usize; 4] = [10, 100, 1_000, 10_000];

fn bench_broadcast_transition(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_transition");
    let owner = Address::basechain([0xAA; 32]);

    for size in SIZES {
        let capacity = u32::try_from(size).unwrap();
        let init = InitParams::with_contacts(owner, random_addresses(size), capacity);
        let state = ContactBookState::from_init(&init).unwrap();
        let ctx = ExecutionContext {
            contract: compute_contract_address(&init).unwrap(),
            sender: owner,
            inbound_value: Coins::ZERO,
            balance: coins(u64::MAX / 2),
            fees: FeeSchedule::default(),
        };

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &state, |b, state| {
            b.iter(|| {
                let mut working = state.clone();
                black_box(services::broadcast(&mut working, &ctx, "Hello", coins(1)).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let contact = Address::basechain([7; 32]);
    let cases = [
        ("top_up", Body::new()),
        ("comment", Body::comment("hello owner")),
        (
            "add_contact",
            codec::encode(&ContractMessage::add_contact(contact)).unwrap(),
        ),
        (
            "broadcast",
            codec::encode(&ContractMessage::broadcast("Hello", coins(1))).unwrap(),
        ),
    ];

    for (name, body) in &cases {
        group.bench_with_input(BenchmarkId::new("decode", name), body, |b, body| {
            b.iter(|| black_box(codec::decode(body).unwrap()));
        });
    }
    group.finish();
}

fn bench_service_broadcast(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("service_broadcast");
    group.sample_size(20);

    for size in [10usize, 100, 1_000] {
        let sandbox = Sandbox::new();
        let owner = Address::basechain([0xAA; 32]);
        let init =
            InitParams::with_contacts(owner, random_addresses(size), u32::try_from(size).unwrap());
        let book = runtime
            .block_on(sandbox.deploy(init, owner, coins(1_000_000_000)))
            .unwrap();
        let message = ContractMessage::broadcast("Hello", Coins::ZERO);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter_batched(
                || sandbox.ledger.clear_log(),
                |()| {
                    runtime
                        .block_on(book.send(owner, Coins::ZERO, &message))
                        .unwrap()
                },
                BatchSize::PerIteration,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_broadcast_transition,
    bench_codec,
    bench_service_broadcast
);
criterion_main!(benches);
