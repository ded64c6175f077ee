//! Benchmarks for candidate ranking
//!
//! Tests performance of filtering and sorting merged candidates.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sourcepool::aggregate::{filter, rank, sort};
use sourcepool::config::{SortConfig, SortKey};
use sourcepool::resolve::KnownHosts;
use sourcepool::source::SourceCandidate;
use sourcepool_common::Quality;
use std::collections::HashMap;

const QUALITIES: [Quality; 4] = [Quality::Low, Quality::Medium, Quality::High, Quality::Hd];

/// Candidates spread over `providers` providers with varied fields.
fn candidates(count: usize, providers: usize) -> Vec<SourceCandidate> {
    (0..count)
        .map(|i| {
            let provider = format!("provider{}", i % providers);
            let mut c = SourceCandidate::new(&provider, format!("https://h{}.example/v/{}", i % 7, i))
                .with_host(format!("h{}.example", i % 7));
            if i % 5 != 0 {
                c = c.with_quality(QUALITIES[i % 4]);
            }
            if i % 3 != 0 {
                c = c.with_views((i as u64 * 7919) % 10_000);
            }
            if i % 2 == 0 {
                c = c.with_rating((i % 101) as u8);
            }
            c
        })
        .collect()
}

fn priorities(providers: usize) -> HashMap<String, i64> {
    (0..providers)
        .map(|i| (format!("provider{}", i), -(i as i64)))
        .collect()
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    let keys = [SortKey::Quality, SortKey::Rating, SortKey::Views];

    for count in [10, 100, 1000] {
        let input = candidates(count, 8);
        let prio = priorities(8);
        group.bench_with_input(BenchmarkId::new("all_keys", count), &input, |b, input| {
            b.iter(|| {
                let mut c = input.clone();
                sort(black_box(&mut c), &prio, &keys);
                c
            })
        });
    }

    let input = candidates(1000, 8);
    let prio = priorities(8);
    group.bench_function("priority_only/1000", |b| {
        b.iter(|| {
            let mut c = input.clone();
            sort(black_box(&mut c), &prio, &[]);
            c
        })
    });

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let hosts = KnownHosts::new(["h1.example", "h3.example", "h5.example"]);
    let input = candidates(1000, 8);

    group.bench_function("known_hosts/1000", |b| {
        b.iter(|| filter(black_box(input.clone()), &hosts))
    });

    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let hosts = KnownHosts::new(["h1.example", "h3.example", "h5.example"]);
    let config = SortConfig {
        filter_unknown_hosts: true,
        ..SortConfig::default()
    };
    let input = candidates(500, 20);
    let prio = priorities(20);

    c.bench_function("rank/500_candidates_20_providers", |b| {
        b.iter(|| rank(black_box(input.clone()), &prio, &config, &hosts))
    });
}

criterion_group!(benches, bench_sort, bench_filter, bench_rank);
criterion_main!(benches);
