//! Chart API Quote Source
//!
//! Implements `QuoteSource` and `BarSource` over the chart endpoint.
//! A batch fetch fans out one request per symbol on a `JoinSet`; the
//! shared rate limiter keeps the fan-out within the API's pacing.
//! Per-symbol failures are logged and dropped; the batch fails only
//! when no symbol could be priced.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::domain::instrument::is_valid_price;
use crate::domain::{DailyBar, IntradayBar, Symbol};
use crate::ports::quote_source::{BarSource, QuoteFetch, QuoteSource};

use super::client::QuoteClient;
use super::types::{ChartEnvelope, ChartResult};

/// Latest price and bar provider backed by the chart API.
#[derive(Clone)]
pub struct YahooQuoteSource {
  client: Arc<QuoteClient>,
}

impl YahooQuoteSource {
  pub fn new(client: Arc<QuoteClient>) -> Self {
    Self { client }
  }

  async fn chart(&self, symbol: &str, range: &str, interval: &str) -> Result<ChartResult> {
    let url = self.client.chart_url(symbol, range, interval)?;
    let envelope: ChartEnvelope = self
      .client
      .get_json(url)
      .await
      .with_context(|| format!("Chart request failed for {symbol}"))?;
    envelope.into_result()
  }

  /// Latest traded price; falls back to the last 1-minute close.
  async fn latest_price(&self, symbol: &str) -> Result<f64> {
    let chart = self.chart(symbol, "1d", "1m").await?;
    let price = chart
      .meta
      .regular_market_price
      .filter(|p| is_valid_price(*p))
      .or_else(|| chart.intraday_bars().last().map(|b| b.close))
      .filter(|p| is_valid_price(*p));
    price.ok_or_else(|| anyhow::anyhow!("No price in chart for {symbol}"))
  }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
  #[instrument(skip(self, symbols), fields(symbols = symbols.len()))]
  async fn fetch(&self, symbols: &[Symbol]) -> QuoteFetch {
    let mut tasks = JoinSet::new();
    for symbol in symbols {
      let source = self.clone();
      let symbol = symbol.clone();
      tasks.spawn(async move {
        let price = source.latest_price(&symbol).await;
        (symbol, price)
      });
    }

    let mut prices = HashMap::with_capacity(symbols.len());
    let mut last_error = None;
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((symbol, Ok(price))) => {
          prices.insert(symbol, price);
        }
        Ok((symbol, Err(e))) => {
          debug!(symbol = %symbol, error = %e, "Quote unavailable");
          last_error = Some(format!("{symbol}: {e:#}"));
        }
        Err(e) => {
          warn!(error = %e, "Quote task aborted");
          last_error = Some(e.to_string());
        }
      }
    }

    match last_error {
      Some(reason) if prices.is_empty() => QuoteFetch::Failed { reason },
      _ => {
        if prices.len() < symbols.len() {
          warn!(
            priced = prices.len(),
            requested = symbols.len(),
            "Partial quote snapshot"
          );
        }
        QuoteFetch::Prices(prices)
      }
    }
  }
}

#[async_trait]
impl BarSource for YahooQuoteSource {
  async fn daily_bars(&self, symbol: &str, days: u32) -> Result<Vec<DailyBar>> {
    let range = format!("{days}d");
    Ok(self.chart(symbol, &range, "1d").await?.daily_bars())
  }

  async fn intraday_bars(&self, symbol: &str) -> Result<Vec<IntradayBar>> {
    Ok(self.chart(symbol, "1d", "5m").await?.intraday_bars())
  }
}
