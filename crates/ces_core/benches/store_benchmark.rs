//! # Slot Store Benchmark
//!
//! Measures the O(1) claims of the slot store:
//! - add / remove churn with slot recycling
//! - handle lookup after heavy compaction
//! - dense iteration
//!
//! Run with: `cargo bench --package ces_core --bench store_benchmark`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ces_core::{Handle, SlotStore};

/// Values per store for the large benchmarks.
const VALUE_COUNT: usize = 1_000_000;

#[derive(Clone, Copy, Default)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

/// Deterministic xorshift sequence of indices below `max`.
fn generate_random_indices(count: usize, max: usize, seed: u64) -> Vec<usize> {
    let mut indices = Vec::with_capacity(count);
    let mut state = seed;

    for _ in 0..count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        indices.push((state as usize) % max);
    }

    indices
}

fn filled_store(count: usize) -> (SlotStore<Position>, Vec<Handle>) {
    let mut store = SlotStore::with_capacity(count);
    let handles = (0..count)
        .map(|i| {
            let f = i as f32;
            store.add(Position { x: f, y: f, z: f })
        })
        .collect();
    (store, handles)
}

/// Benchmark: Fill an empty store.
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for count in [10_000, 100_000, VALUE_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let (store, _) = filled_store(count);
                black_box(store.len())
            });
        });
    }

    group.finish();
}

/// Benchmark: Remove and re-add 100K values, exercising the free list.
fn bench_churn(c: &mut Criterion) {
    let (mut store, mut handles) = filled_store(VALUE_COUNT / 2);
    let picks = generate_random_indices(100_000, handles.len(), 0x9E37_79B9);

    c.bench_function("remove_add_churn_100K", |b| {
        b.iter(|| {
            for &i in &picks {
                if store.remove(handles[i]).is_ok() {
                    handles[i] = store.add(Position::default());
                }
            }
            black_box(store.slot_count())
        });
    });
}

/// Benchmark: Random handle lookups after the dense array has been shuffled.
fn bench_lookup(c: &mut Criterion) {
    let (mut store, mut handles) = filled_store(VALUE_COUNT);
    for &i in &generate_random_indices(VALUE_COUNT / 4, VALUE_COUNT, 7) {
        if store.remove(handles[i]).is_ok() {
            handles[i] = store.add(Position::default());
        }
    }
    let picks = generate_random_indices(10_000, VALUE_COUNT, 42);

    c.bench_function("random_lookup_10K", |b| {
        b.iter(|| {
            let mut sum = 0.0_f32;
            for &i in &picks {
                if let Some(pos) = store.get(handles[i]) {
                    sum += pos.x;
                }
            }
            black_box(sum)
        });
    });
}

/// Benchmark: Dense iteration over every live value.
fn bench_iterate(c: &mut Criterion) {
    let (mut store, _) = filled_store(VALUE_COUNT);

    let mut group = c.benchmark_group("iterate");

    group.bench_function("values_mut_1M", |b| {
        b.iter(|| {
            for pos in store.values_mut() {
                pos.x += 0.001;
                pos.y += 0.001;
                pos.z += 0.001;
            }
            black_box(store.len())
        });
    });

    group.bench_function("iter_with_handles_1M", |b| {
        b.iter(|| {
            let mut generations = 0_u64;
            for (handle, pos) in &store {
                generations += u64::from(handle.generation());
                black_box(pos.x);
            }
            black_box(generations)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_add, bench_churn, bench_lookup, bench_iterate);

criterion_main!(benches);
