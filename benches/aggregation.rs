//! Statistics and time-window throughput benchmark
//!
//! Measures the two whole-log passes that hold state: tallying statistics
//! and selecting/sorting contacts by time.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench aggregation
//! ```

use adiftools::policy::ErrorPolicy;
use adiftools::record::Record;
use adiftools::stats::{StatQuery, StatsAggregator};
use adiftools::window::{select_and_order, SortOrder, TimeWindow};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const BANDS: [&str; 6] = ["160m", "80m", "40m", "20m", "15m", "10M"];
const MODES: [&str; 4] = ["CW", "SSB", "FT8", "RTTY"];

/// Create a contact spread over a month of operating
fn create_bench_record(i: usize) -> Record {
    Record::from_pairs([
        ("call", format!("K{}AA", i % 1000)),
        ("band", BANDS[i % BANDS.len()].to_string()),
        ("mode", MODES[i % MODES.len()].to_string()),
        ("country", format!("ENTITY {}", i % 40)),
        ("dxcc", (i % 340).to_string()),
        ("gridsquare", format!("FN{:02}", i % 100)),
        ("qso_date", format!("202201{:02}", 1 + (i * 7) % 28)),
        ("time_on", format!("{:02}{:02}", (i * 13) % 24, (i * 17) % 60)),
    ])
}

fn bench_stats_record(c: &mut Criterion) {
    let records: Vec<Record> = (0..1000).map(create_bench_record).collect();

    c.bench_function("stats_record_1000", |b| {
        b.iter(|| {
            let mut stats = StatsAggregator::new();
            for record in &records {
                stats.record(black_box(record));
            }
            black_box(stats.record_count());
        });
    });
}

/// Rendering after aggregation, per query
fn bench_stats_render(c: &mut Criterion) {
    let mut stats = StatsAggregator::new();
    for i in 0..5000 {
        stats.record(&create_bench_record(i));
    }

    let mut group = c.benchmark_group("stats_render");
    for query in [StatQuery::Bands, StatQuery::Country, StatQuery::Dxcc, StatQuery::Modes] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", query)),
            &query,
            |b, &query| {
                b.iter(|| black_box(stats.render_text(query)));
            },
        );
    }
    group.finish();
}

/// Select and sort with varying log sizes
fn bench_time_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_order");

    for size in [100, 1000, 10000] {
        let records: Vec<Record> = (0..size).map(create_bench_record).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let ordered = select_and_order(
                    records.clone(),
                    TimeWindow::unbounded(),
                    SortOrder::Ascending,
                    ErrorPolicy::Abort,
                );
                black_box(ordered)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_stats_record,
    bench_stats_render,
    bench_time_order
);
criterion_main!(benches);
