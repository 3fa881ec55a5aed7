//! Extremes Screener - Intraday High-High / Low-Low
//!
//! Summarizes today's intraday bars for every instrument, strongest
//! move first. Callers pick the High-High and Low-Low rows out of it.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::extremes::summarize;
use crate::domain::{ExtremeStatus, IntradaySummary, Symbol};
use crate::ports::quote_source::BarSource;

/// Intraday extremes screener.
pub struct ExtremesScreener {
  bars: Arc<dyn BarSource>,
}

impl ExtremesScreener {
  pub fn new(bars: Arc<dyn BarSource>) -> Self {
    Self { bars }
  }

  /// Screen `universe`. Every instrument with bars is returned, sorted
  /// by change from the open, descending.
  #[instrument(skip(self, universe), fields(universe = universe.len()))]
  pub async fn screen(&self, universe: &[Symbol]) -> Vec<IntradaySummary> {
    let mut summaries = Vec::new();

    for symbol in universe {
      let bars = match self.bars.intraday_bars(symbol).await {
        Ok(bars) => bars,
        Err(e) => {
          warn!(symbol = %symbol, error = %e, "Intraday bars unavailable, skipping");
          continue;
        }
      };
      summaries.extend(summarize(symbol, &bars));
    }

    summaries.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
    info!(
      screened = summaries.len(),
      high_high = summaries.iter().filter(|s| s.status == ExtremeStatus::HighHigh).count(),
      low_low = summaries.iter().filter(|s| s.status == ExtremeStatus::LowLow).count(),
      "Extremes screen complete"
    );
    summaries
  }
}
