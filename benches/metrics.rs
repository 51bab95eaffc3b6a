use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gconc::metrics::{Distribution, Metric};
use gconc::model::{Commit, EntityType, Granularity, WeightKind};
use gconc::util::from_epoch;
use gconc::window::aggregate;

/// Skewed distribution: entity `i` contributes roughly `n / (i + 1)`.
fn zipf(n: u64) -> Distribution {
    Distribution::from_counts((0..n).map(|i| n / (i + 1) + 1))
}

fn history(len: usize, authors: usize) -> Vec<Commit> {
    (0..len)
        .rev()
        .map(|i| {
            let ts = from_epoch(1_600_000_000 + i as i64 * 3600).unwrap();
            let author = format!("dev{}", (i * 7) % authors);
            Commit {
                hash: None,
                author_name: author.clone(),
                author_email: format!("{author}@example.com"),
                author_timestamp: ts,
                committer_name: author.clone(),
                committer_email: format!("{author}@example.com"),
                committer_timestamp: ts,
                message: String::new(),
                lines_added: (i % 50) as u64,
                lines_deleted: (i % 13) as u64,
            }
        })
        .collect()
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    for size in [100u64, 1_000, 10_000] {
        let distribution = zipf(size);
        for metric in Metric::defaults() {
            group.bench_with_input(BenchmarkId::new(metric.to_string(), size), &distribution, |b, d| {
                b.iter(|| metric.compute(black_box(d)))
            });
        }
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let commits = history(50_000, 400);
    let mut group = c.benchmark_group("aggregate");
    for granularity in [Granularity::Commits(250), Granularity::WholeHistory] {
        group.bench_with_input(
            BenchmarkId::from_parameter(granularity),
            &granularity,
            |b, g| b.iter(|| aggregate(black_box(&commits), *g, EntityType::Author, WeightKind::LinesChanged)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_metrics, bench_aggregate);
criterion_main!(benches);
