use binning_map::BinningMap;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng as _, SeedableRng as _};

fn make_intervals(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64 * 0.5).collect()
}

fn make_keys(count: usize, upper: f64, distinct: usize) -> Vec<f64> {
    // Observations drawn from a small pool of distinct values, which is the case the resolution cache targets.
    let seed = 0xC0FFEE;
    let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
    let pool = (0..distinct)
        .map(|_| rng.random_range(-1.0..upper + 1.0))
        .collect::<Vec<f64>>();

    (0..count).map(|_| pool[rng.random_range(0..distinct)]).collect()
}

fn observe_all(map: &mut BinningMap<u64>, keys: &[f64]) {
    for key in keys {
        *map.get_mut(*key).expect("keys are never NaN") += 1;
    }
}

fn bench_resolve(c: &mut Criterion) {
    let interval_counts = [4, 64, 1_024, 16_384];
    let keys_per_iter = 10_000;

    for (name, cache_capacity) in [("cached", 256), ("uncached", 0)] {
        let mut group = c.benchmark_group(format!("binning-map/observe-{}", name));
        group.throughput(Throughput::Elements(keys_per_iter as u64));

        for count in interval_counts {
            let intervals = make_intervals(count);
            let upper = intervals[count - 1];
            let keys = make_keys(keys_per_iter, upper, 128);

            group.bench_with_input(BenchmarkId::from_parameter(count), &keys, |b, keys| {
                let mut map = BinningMap::<u64>::new(intervals.iter().copied())
                    .expect("intervals should be valid")
                    .with_cache_capacity(cache_capacity);
                b.iter(|| observe_all(&mut map, keys));
            });
        }

        group.finish();
    }
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
