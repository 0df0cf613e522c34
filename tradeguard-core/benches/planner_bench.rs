//! Criterion benchmarks for gate hot paths.
//!
//! Benchmarks:
//! 1. Full entry planning through a configured stack
//! 2. Risk chain evaluation (lockout + caps)
//! 3. Session lookup with several windows
//! 4. Trailing stop updates over a price path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use tradeguard_core::clock::ManualClock;
use tradeguard_core::domain::{OrderKind, PositionIntent, RiskMode, Side};
use tradeguard_core::risk::{CapsRule, LockoutEngine, RiskCaps, RiskChain, RiskRule, SharedSnapshot};
use tradeguard_core::session::{CalendarDay, SessionGate, StaticCalendar};
use tradeguard_core::trailing::{StopTracker, TrailingEngine, TrailingProfile};
use tradeguard_core::{GateConfig, GateStack};

// ── Helpers ──────────────────────────────────────────────────────────

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 9, 2, 14, 0, 0).unwrap()))
}

fn calendar(symbols: usize) -> StaticCalendar {
    let date = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
    (0..symbols).fold(StaticCalendar::new(), |cal, i| {
        cal.with_day(
            &format!("SYM{i}"),
            date,
            CalendarDay {
                settlement: Some("16:00-16:15".into()),
                blackouts: vec![
                    "08:29-08:31".into(),
                    "09:29-09:31".into(),
                    "13:59-14:01".into(),
                    "23:55-00:10".into(),
                ],
            },
        )
    })
}

fn price_path(n: usize) -> Vec<Decimal> {
    (0..n)
        .map(|i| Decimal::from(4500) + Decimal::new(((i as f64 * 0.1).sin() * 400.0) as i64, 2))
        .collect()
}

// ── 1. Planning ──────────────────────────────────────────────────────

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    let stack = GateStack::from_config(GateConfig::default(), Arc::new(calendar(50)), clock())
        .expect("default config is valid");

    group.bench_function("accepted_limit", |b| {
        b.iter(|| {
            black_box(stack.plan(
                black_box("SYM7"),
                Side::Long,
                OrderKind::Limit,
                black_box(Decimal::new(450010, 2)),
            ))
        })
    });

    group.bench_function("rejected_flat", |b| {
        b.iter(|| black_box(stack.plan("SYM7", Side::Flat, OrderKind::Market, Decimal::ONE)))
    });

    group.finish();
}

// ── 2. Risk Chain ────────────────────────────────────────────────────

fn bench_risk(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk");
    let clock = clock();
    let snapshot = Arc::new(SharedSnapshot::default());
    let chain = RiskChain::new(RiskMode::DefaultCapitalProtection)
        .with_rule(LockoutEngine::with_defaults(RiskMode::DefaultCapitalProtection, clock))
        .with_rule(CapsRule::new(
            RiskCaps {
                max_contracts: 5,
                daily_loss_limit: Decimal::from(500),
                weekly_loss_limit: Decimal::from(1500),
                trailing_drawdown: Decimal::from(2000),
            },
            snapshot,
        ));
    let intent = PositionIntent::long("ES");

    group.bench_function("evaluate_entry", |b| {
        b.iter(|| black_box(chain.evaluate_entry(black_box(&intent))))
    });

    group.finish();
}

// ── 3. Session ───────────────────────────────────────────────────────

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let at = NaiveDate::from_ymd_opt(2025, 9, 2)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    for symbols in [1usize, 100] {
        let gate = SessionGate::new(calendar(symbols));
        group.bench_with_input(BenchmarkId::new("blocking_window", symbols), &gate, |b, gate| {
            b.iter(|| black_box(gate.blocking_window(black_box("SYM0"), at)))
        });
    }

    group.finish();
}

// ── 4. Trailing ──────────────────────────────────────────────────────

fn bench_trailing(c: &mut Criterion) {
    let mut group = c.benchmark_group("trailing");
    let engine = TrailingEngine::new(Decimal::new(25, 2));

    for n in [100usize, 1000] {
        let path = price_path(n);
        group.bench_with_input(BenchmarkId::new("tracker_path", n), &path, |b, path| {
            b.iter(|| {
                let mut tracker =
                    StopTracker::new(true, path[0], TrailingProfile::fixed_ticks(Decimal::from(8)));
                for p in path {
                    tracker.update(&engine, *p);
                }
                black_box(tracker.current_stop())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plan, bench_risk, bench_session, bench_trailing);
criterion_main!(benches);
