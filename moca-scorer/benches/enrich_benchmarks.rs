//! Criterion benchmarks for stop enrichment.
//!
//! Measures enrichment time for tables of increasing size against a
//! synthetic taxonomy, with a mix of known and unknown tags so both the
//! exact lookup and the similarity scan are exercised.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package moca-scorer
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use moca_core::test_support::{StubOracle, uniform_tag};
use moca_core::{PointsTable, Taxonomy};
use moca_scorer::{EnrichOptions, RetryPolicy, enrich_points};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for deterministic random number generation in benchmarks.
const BENCHMARK_SEED: u64 = 42;

/// Reference tags in the synthetic taxonomy.
const TAXONOMY_SIZE: usize = 300;

/// Embedding width, matching a small multilingual sentence model.
const DIMENSION: usize = 384;

/// Stop counts to benchmark.
const TABLE_SIZES: &[usize] = &[100, 1_000];

fn random_vector(rng: &mut ChaCha8Rng) -> Vec<f32> {
    (0..DIMENSION).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn build_taxonomy(rng: &mut ChaCha8Rng) -> Taxonomy {
    let tags = (0..TAXONOMY_SIZE)
        .map(|index| {
            let embedding = random_vector(rng);
            uniform_tag(
                &format!("tag-{index}"),
                &format!("type-{}", index % 7),
                embedding,
                rng.gen_range(0.0..1.0),
            )
        })
        .collect();
    match Taxonomy::new(tags) {
        Ok(taxonomy) => taxonomy,
        Err(err) => panic!("synthetic taxonomy should be valid: {err}"),
    }
}

fn build_table(rng: &mut ChaCha8Rng, stops: usize) -> PointsTable {
    let rows = (0..stops)
        .map(|stop| {
            let tags: Vec<String> = (0..rng.gen_range(1..6))
                .map(|_| {
                    if rng.gen_bool(0.7) {
                        format!("tag-{}", rng.gen_range(0..TAXONOMY_SIZE))
                    } else {
                        format!("unknown-{}", rng.gen_range(0..50))
                    }
                })
                .collect();
            let raw = single_quoted_list(&tags);
            vec![stop.to_string(), raw]
        })
        .collect();
    match PointsTable::new(vec!["id".into(), "tags".into()], rows) {
        Ok(table) => table,
        Err(err) => panic!("synthetic table should be valid: {err}"),
    }
}

fn single_quoted_list(tags: &[String]) -> String {
    let quoted: Vec<String> = tags.iter().map(|tag| format!("'{tag}'")).collect();
    format!("[{}]", quoted.join(", "))
}

fn build_oracle(rng: &mut ChaCha8Rng) -> StubOracle {
    (0..50).fold(StubOracle::new(DIMENSION), |oracle, index| {
        oracle.with_vector(format!("unknown-{index}"), random_vector(rng))
    })
}

fn enrich_benchmarks(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(BENCHMARK_SEED);
    let taxonomy = build_taxonomy(&mut rng);
    let oracle = build_oracle(&mut rng);
    let options = EnrichOptions::default().with_retry(RetryPolicy::no_retry());

    let mut group = c.benchmark_group("enrich_points");
    for &size in TABLE_SIZES {
        let table = build_table(&mut rng, size);
        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, points| {
            b.iter(|| enrich_points(points, &taxonomy, &oracle, &options));
        });
    }
    group.finish();
}

criterion_group!(benches, enrich_benchmarks);
criterion_main!(benches);
