//! Performance benchmarks for linear-report.
//!
//! This module contains benchmarks for:
//! - Classification of large issue sets
//! - Priority ranking within categories
//! - Full report assembly
//!
//! Run with: `cargo bench`

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linear_report::core::{build_report, rank_all, status, Classifier, Issue, Priority};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    /// Generate a realistic spread of issues across every workflow state.
    pub fn generate_issues(count: usize) -> Vec<Issue> {
        let statuses = status::ALL;
        let priorities = [
            Priority::Unset,
            Priority::Urgent,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ];
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();

        (0..count)
            .map(|i| {
                let state = statuses[i % statuses.len()];
                let mut issue = Issue::new(format!("ISSUE-{i}"))
                    .with_title(format!("Epic number {i}"))
                    .with_status(state)
                    .with_priority(priorities[(i / 3) % priorities.len()])
                    .with_url(format!("https://linear.app/acme/issue/ISSUE-{i}"));
                if state == status::DONE {
                    let age = Duration::days((i % 30) as i64);
                    issue = issue.with_completed_at((now - age).to_rfc3339());
                }
                issue
            })
            .collect()
    }

    pub fn classifier() -> Classifier {
        Classifier::new(Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap(), 14)
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let classifier = fixtures::classifier();

    for size in [50, 200, 1000] {
        let issues = fixtures::generate_issues(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &issues, |b, issues| {
            b.iter(|| classifier.classify(black_box(issues)));
        });
    }

    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let classifier = fixtures::classifier();

    for size in [200, 1000] {
        let issues = fixtures::generate_issues(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &issues, |b, issues| {
            b.iter(|| {
                let mut classification = classifier.classify(issues);
                rank_all(black_box(&mut classification));
                classification
            });
        });
    }

    group.finish();
}

fn bench_build_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_report");
    let classifier = fixtures::classifier();

    for size in [200, 1000] {
        let issues = fixtures::generate_issues(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &issues, |b, issues| {
            b.iter(|| build_report(black_box(issues), &classifier));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_rank, bench_build_report);
criterion_main!(benches);
