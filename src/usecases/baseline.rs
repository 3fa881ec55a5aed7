//! Baseline Capture - Reference Prices at Session Start
//!
//! One batched fetch for the whole universe. Instruments missing from
//! the response are omitted, not retried. An empty response for the
//! entire universe is a session-start failure.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::instrument::{Symbol, is_valid_price};
use crate::ports::quote_source::QuoteSource;

use super::error::TrackerError;

/// Fetch opening reference prices for `universe`.
///
/// Returns only valid prices for universe members.
///
/// # Errors
/// `TrackerError::SessionStart` if no instrument has a usable price.
pub async fn capture_baseline(
  quotes: &dyn QuoteSource,
  universe: &[Symbol],
) -> Result<HashMap<Symbol, f64>, TrackerError> {
  if universe.is_empty() {
    return Err(TrackerError::EmptyUniverse);
  }

  let fetch = quotes.fetch(universe).await;
  let reason = fetch.describe();

  let prices: HashMap<Symbol, f64> = fetch
    .non_empty()
    .unwrap_or_default()
    .into_iter()
    .filter(|(symbol, price)| is_valid_price(*price) && universe.contains(symbol))
    .collect();

  if prices.is_empty() {
    warn!(universe = universe.len(), reason = %reason, "Baseline capture returned no prices");
    return Err(TrackerError::SessionStart {
      universe: universe.len(),
      reason,
    });
  }

  let missing = universe.len() - prices.len();
  if missing > 0 {
    warn!(missing, "Instruments without a baseline are excluded for this session");
  }

  info!(captured = prices.len(), universe = universe.len(), "Baselines captured");
  Ok(prices)
}
