//! Quote Source Port - Price and Bar Retrieval Interface
//!
//! `QuoteSource` returns the latest traded price for a batch of
//! instruments as one atomic call. Failure is a value, not an error:
//! the tracker decides per tick what to do with it.
//!
//! `BarSource` serves the scanners with historical daily and
//! intraday bars.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::instrument::Symbol;
use crate::domain::{DailyBar, IntradayBar};

/// Outcome of one batched price fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteFetch {
  /// Latest price per instrument. May be partial or empty.
  Prices(HashMap<Symbol, f64>),
  /// The whole batch failed.
  Failed {
    /// Human-readable cause, for logs.
    reason: String,
  },
}

impl QuoteFetch {
  /// Prices if the fetch produced at least one, otherwise `None`.
  pub fn non_empty(self) -> Option<HashMap<Symbol, f64>> {
    match self {
      Self::Prices(prices) if !prices.is_empty() => Some(prices),
      _ => None,
    }
  }

  /// Short description for logging.
  pub fn describe(&self) -> String {
    match self {
      Self::Prices(prices) if prices.is_empty() => "empty response".to_string(),
      Self::Prices(prices) => format!("{} prices", prices.len()),
      Self::Failed { reason } => reason.clone(),
    }
  }
}

/// Trait for latest-price providers.
///
/// Implementors own their retry, backoff and timeout policy and must
/// degrade to `QuoteFetch::Failed` or an empty map rather than panic
/// or block indefinitely.
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
  /// Fetch the latest traded price for every symbol in the batch.
  async fn fetch(&self, symbols: &[Symbol]) -> QuoteFetch;
}

/// Trait for historical bar providers.
#[async_trait]
pub trait BarSource: Send + Sync + 'static {
  /// Most recent daily bars, oldest first. `days` is the lookback.
  async fn daily_bars(&self, symbol: &str, days: u32) -> anyhow::Result<Vec<DailyBar>>;

  /// Today's 5-minute bars, oldest first.
  async fn intraday_bars(&self, symbol: &str) -> anyhow::Result<Vec<IntradayBar>>;
}
