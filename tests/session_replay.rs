//! Session Replay - Recorded Morning Through the Real Adapters
//!
//! Replays a fixed price path for a handful of NIFTY constituents
//! through the session, finalizes via the report emitter with the
//! file store and log notifier, then reads the report back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use tokio::sync::RwLock;

use nifty_trend_tracker::adapters::notify::LogNotifier;
use nifty_trend_tracker::adapters::persistence::FileReportStore;
use nifty_trend_tracker::domain::{Session, TrendState};
use nifty_trend_tracker::ports::repository::{ReportStore, SaveOutcome, StoreError};
use nifty_trend_tracker::usecases::{DeliveryStatus, FinalizeOutcome, ReportEmitter, TrackerError};

/// One price path per symbol, first column is the baseline.
const MORNING: &[(&str, [f64; 6])] = &[
    ("RELIANCE.NS", [2900.0, 2905.0, 2912.5, 2910.0, 2921.0, 2929.0]),
    ("TCS.NS", [3500.0, 3490.0, 3482.0, 3475.0, 3480.0, 3465.0]),
    ("INFY.NS", [1500.0, 1504.0, 1498.0, 1510.0, 1512.0, 1515.0]),
    ("HDFCBANK.NS", [1600.0, 1600.0, 1600.0, 1600.0, 1600.0, 1600.0]),
    ("ITC.NS", [420.0, 421.0, 422.0, 423.0, 424.0, 425.0]),
];

fn snapshot(col: usize) -> HashMap<String, f64> {
    MORNING
        .iter()
        .map(|(symbol, path)| (symbol.to_string(), path[col]))
        .collect()
}

#[tokio::test]
async fn test_replayed_morning_persists_expected_report() {
    let root = std::env::temp_dir().join(format!("ntt-replay-{}", uuid::Uuid::new_v4()));
    let store = Arc::new(
        FileReportStore::with_dirs(root.join("data"), root.join("reports"))
            .await
            .unwrap(),
    );
    let emitter = ReportEmitter::new(store.clone(), Some(Arc::new(LogNotifier)), false);

    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 3, 45, 0).unwrap();
    let universe: Vec<String> = MORNING.iter().map(|(s, _)| s.to_string()).collect();

    let session = RwLock::new(Session::new());
    {
        let mut s = session.write().await;
        s.rearm(&universe, date);
        assert_eq!(s.capture_baselines(&snapshot(0), t0), 5);
        for col in 1..6 {
            s.apply_snapshot(&snapshot(col), t0 + chrono::Duration::seconds(30 * col as i64));
        }
        assert_eq!(s.state("INFY.NS"), Some(TrendState::Disqualified));
        assert_eq!(s.state("HDFCBANK.NS"), Some(TrendState::Unclassified));
    }

    let outcome = emitter.finalize(&session, t0 + chrono::Duration::minutes(15)).await.unwrap();
    let FinalizeOutcome::Finalized { result, saved, delivery } = outcome else {
        panic!("expected a fresh finalize");
    };
    assert_eq!(delivery, DeliveryStatus::Delivered);
    assert!(matches!(saved, SaveOutcome::Created(_)));

    let order: Vec<(&str, TrendState)> = result
        .entries
        .iter()
        .map(|e| (e.symbol.as_str(), e.state))
        .collect();
    assert_eq!(
        order,
        [
            ("ITC.NS", TrendState::Rising),
            ("RELIANCE.NS", TrendState::Rising),
            ("TCS.NS", TrendState::Falling),
        ]
    );

    let text = result.render_text();
    assert!(text.contains("ITC: 1.19% (Rising)"));
    assert!(text.contains("TCS: 1.00% (Falling)"));

    // Stored rows carry display symbols and two-decimal values.
    let stored = store.load_session(date).await.unwrap().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].symbol, "ITC");
    assert_eq!(stored[0].change_pct, 1.19);
    assert_eq!(stored[2].price, 3465.0);

    // A second session for the same day must not clobber the file.
    let rerun = RwLock::new(Session::new());
    {
        let mut s = rerun.write().await;
        s.rearm(&universe, date);
        s.capture_baselines(&snapshot(0), t0);
    }
    let err = emitter.finalize(&rerun, t0).await.unwrap_err();
    assert!(matches!(err, TrackerError::Store(StoreError::AlreadyExists(_))));
    assert!(!rerun.read().await.is_finalized());

    std::fs::remove_dir_all(root).unwrap();
}
