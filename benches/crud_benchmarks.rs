use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tally_tree::{OrderStatMap, SamplingMap};

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for a deterministic pseudo-random sequence.
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Map benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_ordered");

    group.bench_function(BenchmarkId::new("OrderStatMap", N), |b| {
        b.iter(|| {
            let mut map = OrderStatMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_insert_random");

    group.bench_function(BenchmarkId::new("OrderStatMap", N), |b| {
        b.iter(|| {
            let mut map = OrderStatMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let os_map: OrderStatMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_get_random");

    group.bench_function(BenchmarkId::new("OrderStatMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = os_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_map_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("OrderStatMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<OrderStatMap<i64, i64>>(),
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ─── Order-statistic benchmarks ─────────────────────────────────────────────

fn bench_rank_access(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let os_map: OrderStatMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("rank_access");

    group.bench_function(BenchmarkId::new("OrderStatMap::get_by_rank", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for rank in 0..os_map.len() {
                let (_, &v) = os_map.get_by_rank(rank).unwrap();
                sum = sum.wrapping_add(v);
            }
            sum
        });
    });

    // The O(n log n) descent beats the O(n^2) of nth() on a plain BTreeMap;
    // keep the comparison honest by only walking a slice of ranks.
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    group.bench_function(BenchmarkId::new("BTreeMap::iter().nth", 100), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for rank in (0..N).step_by(N / 100) {
                let (_, &v) = bt_map.iter().nth(rank).unwrap();
                sum = sum.wrapping_add(v);
            }
            sum
        });
    });

    group.finish();
}

// ─── Sampling benchmarks ────────────────────────────────────────────────────

fn bench_weighted_sampling(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let map: SamplingMap<i64, i64, u64> =
        (0..N as i64).map(|k| (k, k, rng.gen_range(1..100u64))).collect();

    let mut group = c.benchmark_group("weighted_sampling");

    group.bench_function(BenchmarkId::new("SamplingMap::sample", N), |b| {
        let mut draw_rng = rand::rngs::StdRng::seed_from_u64(2);
        b.iter(|| map.sample(&mut draw_rng));
    });

    group.bench_function(BenchmarkId::new("SamplingMap::sample_at", N), |b| {
        let total = map.total_weight();
        let mut position = 0u64;
        b.iter(|| {
            position = (position + 12_347) % total;
            map.sample_at(position)
        });
    });

    group.finish();
}

fn bench_set_weight(c: &mut Criterion) {
    let mut map: SamplingMap<i64, i64, u64> = (0..N as i64).map(|k| (k, k, 1u64)).collect();
    // Cursors are stable across re-weights, so they can be captured once.
    let cursors: Vec<_> = (0..N as i64).map(|k| map.find(&k)).collect();

    let mut group = c.benchmark_group("set_weight");

    group.bench_function(BenchmarkId::new("SamplingMap::set_weight", N), |b| {
        let mut round = 0u64;
        b.iter(|| {
            round += 1;
            for &cursor in &cursors {
                map.set_weight(cursor, round % 7 + 1);
            }
            map.total_weight()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_map_insert_ordered,
    bench_map_insert_random,
    bench_map_get_random,
    bench_map_remove_random,
    bench_rank_access,
    bench_weighted_sampling,
    bench_set_weight,
);
criterion_main!(benches);
