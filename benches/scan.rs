//! Benchmarks for windowing and the scan loop.

use chartscan::prelude::*;
use chrono::{NaiveDate, TimeDelta};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Never finds anything, so the scan visits every window
struct Blind;

impl PatternDetector for Blind {
    fn detect(&self, image: &ChartImage, _threshold: Ratio) -> Result<DetectionResult> {
        Ok(DetectionResult::empty(image.clone()))
    }
}

/// Generate deterministic hourly candles
fn generate_series(n: usize) -> PriceSeries {
    let t0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let mut price = 100.0;
    let candles = (0..n)
        .map(|i| {
            let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
            let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;
            let o = price;
            let c = price + change;
            price = c;
            Candle::new(
                t0 + TimeDelta::hours(i as i64),
                o,
                o.max(c) + volatility * 0.5,
                o.min(c) - volatility * 0.5,
                c,
                1000.0,
            )
        })
        .collect();
    PriceSeries::new(candles).unwrap()
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    for len in [720, 7_200, 72_000] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter(|| partition(black_box(len), &Timeframe::OneHour).unwrap())
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let series = generate_series(72);
    let renderer = SvgRenderer::default();
    c.bench_function("svg_render_72", |b| {
        b.iter(|| renderer.render(black_box(series.candles())).unwrap())
    });
}

fn bench_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");
    let scanner = ScannerBuilder::new(SvgRenderer::default(), Blind).build().unwrap();
    for days in [30, 300] {
        let series = generate_series(days * 24);
        group.bench_with_input(BenchmarkId::from_parameter(days), &series, |b, series| {
            b.iter(|| scanner.scan(black_box(series), &Timeframe::OneHour).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_partition, bench_render, bench_full_scan);
criterion_main!(benches);
