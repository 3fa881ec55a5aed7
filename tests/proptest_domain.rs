//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that the trend classifier and session
//! maintain their invariants across random price paths.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;

use nifty_trend_tracker::domain::gap::detect_gap;
use nifty_trend_tracker::domain::{DailyBar, GapKind, Session, TrendState};

/// Prices on a coarse grid so paths hit the baseline exactly.
fn price() -> impl Strategy<Value = f64> {
    (90u32..=110).prop_map(|p| p as f64)
}

// ── Trend Classifier Properties ─────────────────────────────

proptest! {
    /// Once disqualified, no later price changes the state.
    #[test]
    fn disqualified_is_absorbing(path in prop::collection::vec(price(), 1..60)) {
        let baseline = 100.0;
        let mut state = TrendState::Unclassified;
        let mut disqualified = false;
        for p in path {
            state = state.advance(baseline, p);
            if disqualified {
                prop_assert_eq!(state, TrendState::Disqualified);
            }
            disqualified |= state == TrendState::Disqualified;
        }
    }

    /// Rising means no observed price has been below the baseline;
    /// Falling means none has been above it.
    #[test]
    fn direction_matches_path(path in prop::collection::vec(price(), 1..60)) {
        let baseline = 100.0;
        let mut state = TrendState::Unclassified;
        for p in &path {
            state = state.advance(baseline, *p);
        }
        match state {
            TrendState::Rising => {
                prop_assert!(path.iter().all(|p| *p >= baseline));
                prop_assert!(path.iter().any(|p| *p > baseline));
            }
            TrendState::Falling => {
                prop_assert!(path.iter().all(|p| *p <= baseline));
                prop_assert!(path.iter().any(|p| *p < baseline));
            }
            TrendState::Unclassified => {
                prop_assert!(path.iter().all(|p| *p == baseline));
            }
            TrendState::Disqualified => {
                prop_assert!(path.iter().any(|p| *p > baseline));
                prop_assert!(path.iter().any(|p| *p < baseline));
            }
        }
    }
}

// ── Session Properties ──────────────────────────────────────

proptest! {
    /// A finalized result holds only directional instruments, the
    /// Rising block first, each block sorted by descending change.
    #[test]
    fn result_is_directional_and_ordered(
        paths in prop::collection::vec(prop::collection::vec(price(), 1..20), 1..12)
    ) {
        let universe: Vec<String> = (0..paths.len()).map(|i| format!("S{i}.NS")).collect();
        let mut session = Session::new();
        session.rearm(&universe, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

        let baselines: HashMap<String, f64> = universe.iter().map(|s| (s.clone(), 100.0)).collect();
        session.capture_baselines(&baselines, Utc::now());

        let ticks = paths.iter().map(Vec::len).max().unwrap_or(0);
        for t in 0..ticks {
            let snapshot: HashMap<String, f64> = universe
                .iter()
                .zip(&paths)
                .filter_map(|(s, path)| path.get(t).map(|p| (s.clone(), *p)))
                .collect();
            session.apply_snapshot(&snapshot, Utc::now());
        }

        let result = session.build_result(Utc::now());
        prop_assert!(result.entries.iter().all(|e| e.state.is_directional()));
        prop_assert!(result.entries.iter().all(|e| e.change_pct >= 0.0));

        let first_falling = result
            .entries
            .iter()
            .position(|e| e.state == TrendState::Falling)
            .unwrap_or(result.entries.len());
        prop_assert!(result.entries[first_falling..].iter().all(|e| e.state == TrendState::Falling));
        for block in [&result.entries[..first_falling], &result.entries[first_falling..]] {
            prop_assert!(block.windows(2).all(|w| w[0].change_pct >= w[1].change_pct));
        }
    }
}

// ── Gap Detection Properties ────────────────────────────────

proptest! {
    /// A gap is reported exactly when the open leaves yesterday's range,
    /// and its size is always positive.
    #[test]
    fn gap_iff_open_outside_range(
        low in 50.0f64..100.0,
        width in 0.0f64..20.0,
        open in 40.0f64..130.0,
    ) {
        let high = low + width;
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let bars = [
            DailyBar { date, open: low, high, low, close: low },
            DailyBar { date: date.succ_opt().unwrap(), open, high: open, low: open, close: open },
        ];

        match detect_gap("X.NS", &bars) {
            Some(signal) => {
                prop_assert!(signal.gap_pct > 0.0);
                match signal.kind {
                    GapKind::GapUpBreakout => prop_assert!(open > high),
                    GapKind::GapDownBreakdown => prop_assert!(open < low),
                }
            }
            None => prop_assert!(open >= low && open <= high),
        }
    }
}
