//! Gap Scanner - Opening Gaps Across the Universe
//!
//! For each instrument, pulls the recent daily bars and compares
//! today's open with yesterday's high/low. Instruments whose history
//! cannot be fetched, or that have fewer than two bars, are skipped
//! with a warning; one bad symbol never aborts the scan.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::domain::gap::detect_gap;
use crate::domain::{GapReport, GapSignal, Symbol};
use crate::ports::quote_source::BarSource;

/// Round to two decimals for reporting.
fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

/// Daily-gap scanner.
pub struct GapScanner {
  bars: Arc<dyn BarSource>,
  lookback_days: u32,
}

impl GapScanner {
  /// Create a scanner pulling `lookback_days` of daily history.
  pub fn new(bars: Arc<dyn BarSource>, lookback_days: u32) -> Self {
    Self {
      bars,
      lookback_days: lookback_days.max(2),
    }
  }

  /// Scan `universe` and collect gaps in universe order.
  #[instrument(skip(self, universe), fields(universe = universe.len()))]
  pub async fn scan(&self, universe: &[Symbol], date: NaiveDate) -> GapReport {
    let mut signals = Vec::new();
    let mut skipped = 0usize;

    for symbol in universe {
      let bars = match self.bars.daily_bars(symbol, self.lookback_days).await {
        Ok(bars) => bars,
        Err(e) => {
          warn!(symbol = %symbol, error = %e, "Daily bars unavailable, skipping");
          skipped += 1;
          continue;
        }
      };
      if bars.len() < 2 {
        debug!(symbol = %symbol, bars = bars.len(), "Not enough history, skipping");
        skipped += 1;
        continue;
      }

      if let Some(signal) = detect_gap(symbol, &bars) {
        debug!(symbol = %symbol, kind = %signal.kind, gap_pct = signal.gap_pct, "Gap detected");
        signals.push(GapSignal {
          yesterday_high: round2(signal.yesterday_high),
          yesterday_low: round2(signal.yesterday_low),
          today_open: round2(signal.today_open),
          gap_pct: round2(signal.gap_pct),
          ..signal
        });
      }
    }

    let report = GapReport { date, signals };
    info!(
      gap_ups = report.gap_ups().count(),
      gap_downs = report.gap_downs().count(),
      skipped,
      "Gap scan complete"
    );
    report
  }
}
