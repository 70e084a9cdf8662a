//! Criterion benchmarks for fastee-nn: pruning sweep against brute force.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fastee_distance::{EnvelopeCache, Family, FamilyKind, FamilyOptions, SeriesCollection, TimeSeries};
use fastee_nn::{BruteForceLoocv, ParameterSweep, SearchCounters, TrainingStrategy};

/// Noisy sines in two classes that differ by frequency.
fn make_collection(count: usize, len: usize, seed: u64) -> SeriesCollection {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut series = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);
    for i in 0..count {
        let class = i % 2;
        let freq = if class == 0 { 0.15 } else { 0.22 };
        let phase: f64 = rng.gen_range(0.0..1.0);
        let values = (0..len)
            .map(|t| (t as f64 * freq + phase).sin() + rng.gen_range(-0.2..0.2))
            .collect();
        series.push(TimeSeries::new(values).unwrap());
        labels.push(class);
    }
    SeriesCollection::new(series, labels, 2).unwrap()
}

fn bench_build_table(c: &mut Criterion) {
    let collection = make_collection(30, 64, 42);
    let cache = EnvelopeCache::new(&collection);
    let options = FamilyOptions { window_steps: 20 };
    let mut group = c.benchmark_group("build_table_30x64");
    group.sample_size(10);

    for kind in [FamilyKind::Dtw, FamilyKind::Erp, FamilyKind::Msm] {
        let family = Family::build(kind, &collection, options).unwrap();
        group.bench_function(BenchmarkId::new("sweep", kind.as_str()), |b| {
            b.iter(|| {
                let mut counters = SearchCounters::default();
                ParameterSweep::default().build_table(&family, &collection, &cache, &mut counters)
            });
        });
        group.bench_function(BenchmarkId::new("brute_force", kind.as_str()), |b| {
            b.iter(|| {
                let mut counters = SearchCounters::default();
                BruteForceLoocv.build_table(&family, &collection, &cache, &mut counters)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_table);
criterion_main!(benches);
