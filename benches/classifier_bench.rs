//! Classifier Benchmarks — Tick Hot-Path Performance
//!
//! Benchmarks the domain work done on every poll tick for the full
//! 50-instrument universe.
//!
//! Run with: cargo bench --bench classifier_bench

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use nifty_trend_tracker::domain::instrument::nifty_50;
use nifty_trend_tracker::domain::{Session, TrendState};

fn armed_session() -> (Session, Vec<String>) {
    let universe = nifty_50();
    let mut session = Session::new();
    session.rearm(&universe, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or_default());
    let baselines: HashMap<String, f64> = universe.iter().map(|s| (s.clone(), 100.0)).collect();
    session.capture_baselines(&baselines, Utc::now());
    (session, universe)
}

/// Benchmark the state machine for a single instrument.
fn bench_advance(c: &mut Criterion) {
    c.bench_function("trend_advance", |b| {
        b.iter(|| black_box(TrendState::Unclassified).advance(black_box(100.0), black_box(100.5)));
    });
}

/// Benchmark applying one 50-instrument snapshot.
fn bench_apply_snapshot(c: &mut Criterion) {
    let (mut session, universe) = armed_session();
    let snapshot: HashMap<String, f64> = universe
        .iter()
        .enumerate()
        .map(|(i, s)| (s.clone(), if i % 2 == 0 { 101.0 } else { 99.0 }))
        .collect();

    c.bench_function("apply_snapshot_nifty50", |b| {
        b.iter(|| session.apply_snapshot(black_box(&snapshot), Utc::now()));
    });
}

/// Benchmark building the display board.
fn bench_board(c: &mut Criterion) {
    let (mut session, universe) = armed_session();
    let snapshot: HashMap<String, f64> = universe
        .iter()
        .enumerate()
        .map(|(i, s)| (s.clone(), 95.0 + i as f64 * 0.2))
        .collect();
    session.apply_snapshot(&snapshot, Utc::now());

    c.bench_function("board_nifty50", |b| {
        b.iter(|| black_box(session.board()));
    });
}

criterion_group!(benches, bench_advance, bench_apply_snapshot, bench_board);
criterion_main!(benches);
