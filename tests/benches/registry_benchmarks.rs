//! # Safe Registry Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | sr-01 Compact List | append, paged slice |
//! | sr-02 Signature Verification | signer recovery |
//! | sr-03 Transaction Registry | enqueue end to end |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::{CallContext, Hash, U256};
use sr_01_compact_list::{CompactIndexedList, InMemoryKVStore};
use sr_02_signature_verification::recover_signer;
use sr_02_signature_verification::test_helpers::{generate_key, sign_digest};
use sr_03_transaction_registry::TransactionRegistryApi;
use sr_tests::fixtures::{digest, memory_plaintext_registry, signed_enqueue, transfer, RELAYER, SAFE};
use std::time::Duration;

// ============================================================================
// SR-01: Compact List
// ============================================================================

fn bench_compact_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sr-01-compact-list");

    group.bench_function("append", |b| {
        let mut store = InMemoryKVStore::new();
        let list = CompactIndexedList::<Hash>::new(b"bench/append".to_vec());
        b.iter(|| black_box(list.append(&mut store, &[0xAB; 32]).ok()))
    });

    let mut store = InMemoryKVStore::new();
    let list = CompactIndexedList::<Hash>::new(b"bench/slice".to_vec());
    for i in 0..10_000u32 {
        let mut value = [0u8; 32];
        value[28..].copy_from_slice(&i.to_be_bytes());
        let _ = list.append(&mut store, &value);
    }

    for count in [1u64, 10, 100, 1_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("slice", count), &count, |b, &count| {
            b.iter(|| black_box(list.slice(&store, 4_321, count).map(|items| items.len())))
        });
    }

    group.finish();
}

// ============================================================================
// SR-02: Signature Verification
// ============================================================================

fn bench_recover_signer(c: &mut Criterion) {
    let mut group = c.benchmark_group("sr-02-signature-verification");
    group.measurement_time(Duration::from_secs(10));

    let key = generate_key();
    let tx_digest = digest(U256::one(), SAFE, &transfer(1), U256::zero());
    let signature = sign_digest(&tx_digest, &key);

    group.bench_function("recover_signer", |b| {
        b.iter(|| black_box(recover_signer(&tx_digest, &signature).is_ok()))
    });

    group.finish();
}

// ============================================================================
// SR-03: Transaction Registry
// ============================================================================

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("sr-03-transaction-registry");
    group.throughput(Throughput::Elements(1));

    let key = generate_key();
    let request = signed_enqueue(&key, U256::one(), SAFE, U256::zero(), transfer(1));

    group.bench_function("enqueue_transaction", |b| {
        let (mut registry, _bus) = memory_plaintext_registry();
        let mut block = 0u64;
        b.iter(|| {
            block += 1;
            black_box(
                registry
                    .enqueue_transaction(&CallContext::new(RELAYER, block), request.clone())
                    .is_ok(),
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compact_list,
    bench_recover_signer,
    bench_enqueue
);
criterion_main!(benches);
