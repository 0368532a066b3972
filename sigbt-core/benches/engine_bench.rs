//! Criterion benchmarks for the engine hot paths.
//!
//! Benchmarks:
//! 1. Full backtest pass over a sinusoidal series with periodic signals
//! 2. Ledger transitions in isolation (open/close/flip churn)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sigbt_core::domain::{Bar, BarSeries, Signal};
use sigbt_core::engine::{run_backtest, BacktestParams, CurveCompat, Ledger};

// ── Helpers ──────────────────────────────────────────────────────────

fn signal_at(i: usize) -> Signal {
    match i % 17 {
        0 => Signal::Buy,
        5 => Signal::FlipShort,
        9 => Signal::FlipLong,
        13 => Signal::Sell,
        16 => Signal::Buy,
        _ => Signal::Hold,
    }
}

fn make_bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar {
                timestamp: format!("2020-01-01T{:06}", i),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                signal: signal_at(i),
            }
        })
        .collect()
}

// ── 1. Full pass ─────────────────────────────────────────────────────

fn bench_run_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_backtest");

    for &bar_count in &[252, 2520, 25_200] {
        let series = BarSeries::new(make_bars(bar_count)).unwrap();
        for compat in [CurveCompat::Corrected, CurveCompat::Legacy] {
            let params = BacktestParams::default().with_curve_compat(compat);
            group.bench_with_input(
                BenchmarkId::new(format!("{compat:?}"), bar_count),
                &bar_count,
                |b, _| b.iter(|| run_backtest(black_box(&series), black_box(&params)).unwrap()),
            );
        }
    }

    group.finish();
}

// ── 2. Ledger transitions ────────────────────────────────────────────

fn bench_ledger(c: &mut Criterion) {
    let bars = make_bars(2520);

    c.bench_function("ledger_apply_2520", |b| {
        b.iter(|| {
            let mut ledger = Ledger::new(1000.0, 0.15);
            for (i, bar) in bars.iter().enumerate() {
                black_box(ledger.apply(i, bar));
            }
            ledger.balance()
        })
    });
}

criterion_group!(benches, bench_run_backtest, bench_ledger);
criterion_main!(benches);
