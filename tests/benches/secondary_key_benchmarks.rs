//! # Secondary-Key Benchmarks
//!
//! | Path | Work per call |
//! |------|---------------|
//! | memo authentication | decode + store read + one verify |
//! | process proposal (bound) | one verify per entry |
//! | process proposal (unbound) | one recover + one verify per entry |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use secondary_keys::{
    decode_memo, InMemoryKeyValueStore, MsgRegisterSecondaryKey, SecondaryKeyApi,
    SecondaryKeyConfig, SecondaryKeyService, SecondarySignature, SecondarySigningKey,
};
use sk_tests::fixtures::{ctx, signed_memo, transfer, TestNetwork};
use shared_types::ProcessProposalRequest;
use std::sync::Arc;
use std::time::Duration;

fn bench_memo_authentication(c: &mut Criterion) {
    let mut group = c.benchmark_group("secondary-signature-decorator");
    group.measurement_time(Duration::from_secs(5));

    let service = SecondaryKeyService::new(
        Arc::new(InMemoryKeyValueStore::new()),
        SecondaryKeyConfig::default(),
    )
    .unwrap();
    let key = SecondarySigningKey::random();
    let sender = [0xA1; 20];
    service
        .register_secondary_key(
            &ctx(1),
            MsgRegisterSecondaryKey {
                sender,
                envelope: SecondarySignature::sign_account(&key)
                    .unwrap()
                    .encode()
                    .unwrap(),
            },
        )
        .unwrap();

    let memo = signed_memo(&key, "SECONDARY");
    let tx = transfer(sender, memo.clone());
    let plain = transfer(sender, "no secondary factor");

    group.bench_function("decode_memo", |b| {
        b.iter(|| black_box(decode_memo(&memo, "SECONDARY").unwrap()))
    });
    group.bench_function("authenticate_verified", |b| {
        b.iter(|| black_box(service.authenticate_tx(&ctx(2), &tx, false).is_ok()))
    });
    group.bench_function("authenticate_pass_through", |b| {
        b.iter(|| black_box(service.authenticate_tx(&ctx(2), &plain, false).is_ok()))
    });

    group.finish();
}

fn bench_process_proposal(c: &mut Criterion) {
    let mut group = c.benchmark_group("process-proposal");
    group.measurement_time(Duration::from_secs(10));

    for size in [4u8, 16, 64] {
        let network = TestNetwork::new(size, SecondaryKeyConfig::default());
        let commit = network.commit(1, [0x01; 32]);
        let txs = network.propose(2, commit.clone());
        let req = ProcessProposalRequest {
            height: 2,
            txs,
            proposed_last_commit: commit,
        };

        group.throughput(Throughput::Elements(size as u64));

        // A fresh replica every iteration keeps the recovery path hot.
        group.bench_with_input(BenchmarkId::new("unbound", size), &req, |b, req| {
            b.iter_batched(
                || {
                    SecondaryKeyService::new(
                        Arc::new(InMemoryKeyValueStore::new()),
                        SecondaryKeyConfig::default(),
                    )
                    .unwrap()
                },
                |replica| black_box(replica.process_proposal(req)),
                criterion::BatchSize::SmallInput,
            )
        });

        let bound = &network.validators[0].node.service;
        bound.process_proposal(&req);
        group.bench_with_input(BenchmarkId::new("bound", size), &req, |b, req| {
            b.iter(|| black_box(bound.process_proposal(req)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_memo_authentication, bench_process_proposal);
criterion_main!(benches);
