//! Chart API Response Types
//!
//! Deserialization types for the `/v8/finance/chart` endpoint plus
//! conversion into domain bars. Price arrays carry `null` for bars
//! without trades; those bars are dropped.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::domain::{DailyBar, IntradayBar};

/// Top-level envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
  pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
  #[serde(default)]
  pub result: Option<Vec<ChartResult>>,
  #[serde(default)]
  pub error: Option<ChartError>,
}

/// API-level error, returned with a 200 or 404 body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
  pub code: String,
  pub description: String,
}

/// One instrument's chart.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
  pub meta: ChartMeta,
  /// Bar start times, unix seconds.
  #[serde(default)]
  pub timestamp: Vec<i64>,
  pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
  pub symbol: String,
  /// Latest traded price.
  #[serde(default)]
  pub regular_market_price: Option<f64>,
  /// Exchange offset from UTC, seconds.
  #[serde(default)]
  pub gmtoffset: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
  #[serde(default)]
  pub quote: Vec<QuoteSeries>,
}

/// OHLC columns, aligned with `ChartResult::timestamp`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSeries {
  #[serde(default)]
  pub open: Vec<Option<f64>>,
  #[serde(default)]
  pub high: Vec<Option<f64>>,
  #[serde(default)]
  pub low: Vec<Option<f64>>,
  #[serde(default)]
  pub close: Vec<Option<f64>>,
}

impl ChartEnvelope {
  /// The single chart result, or the API's error.
  pub fn into_result(self) -> anyhow::Result<ChartResult> {
    if let Some(err) = self.chart.error {
      anyhow::bail!("Chart API error {}: {}", err.code, err.description);
    }
    self
      .chart
      .result
      .and_then(|results| results.into_iter().next())
      .ok_or_else(|| anyhow::anyhow!("Chart API returned no result"))
  }
}

impl ChartResult {
  /// Complete OHLC rows as `(timestamp, open, high, low, close)`.
  fn rows(&self) -> impl Iterator<Item = (i64, f64, f64, f64, f64)> + '_ {
    let series = self.indicators.quote.first();
    self.timestamp.iter().enumerate().filter_map(move |(i, &ts)| {
      let s = series?;
      let open = (*s.open.get(i)?)?;
      let high = (*s.high.get(i)?)?;
      let low = (*s.low.get(i)?)?;
      let close = (*s.close.get(i)?)?;
      Some((ts, open, high, low, close))
    })
  }

  /// Daily bars, oldest first, dated in the exchange's local time.
  pub fn daily_bars(&self) -> Vec<DailyBar> {
    let offset = FixedOffset::east_opt(self.meta.gmtoffset).unwrap_or_else(|| Utc.fix());
    self
      .rows()
      .filter_map(|(ts, open, high, low, close)| {
        let date = DateTime::from_timestamp(ts, 0)?
          .with_timezone(&offset)
          .date_naive();
        Some(DailyBar { date, open, high, low, close })
      })
      .collect()
  }

  /// Intraday bars, oldest first.
  pub fn intraday_bars(&self) -> Vec<IntradayBar> {
    self
      .rows()
      .map(|(timestamp, open, high, low, close)| IntradayBar {
        timestamp,
        open,
        high,
        low,
        close,
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DAILY: &str = r#"{
    "chart": {
      "result": [{
        "meta": { "symbol": "TCS.NS", "regularMarketPrice": 3512.4, "gmtoffset": 19800 },
        "timestamp": [1772509500, 1772595900, 1772682300],
        "indicators": { "quote": [{
          "open":  [3400.0, null, 3450.5],
          "high":  [3420.0, 3440.0, 3470.0],
          "low":   [3390.0, 3410.0, 3445.0],
          "close": [3410.0, 3430.0, 3460.0]
        }]}
      }],
      "error": null
    }
  }"#;

  #[test]
  fn test_parse_daily_drops_incomplete_rows() {
    let chart: ChartEnvelope = serde_json::from_str(DAILY).unwrap();
    let result = chart.into_result().unwrap();
    assert_eq!(result.meta.regular_market_price, Some(3512.4));

    let bars = result.daily_bars();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[1].open, 3450.5);
    assert!(bars[0].date < bars[1].date);
  }

  #[test]
  fn test_api_error_surfaces() {
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    let chart: ChartEnvelope = serde_json::from_str(body).unwrap();
    let err = chart.into_result().unwrap_err();
    assert!(err.to_string().contains("delisted"));
  }

  #[test]
  fn test_missing_quote_series_is_empty() {
    let body = r#"{"chart":{"result":[{"meta":{"symbol":"X.NS"},"timestamp":[1],"indicators":{"quote":[]}}],"error":null}}"#;
    let chart: ChartEnvelope = serde_json::from_str(body).unwrap();
    assert!(chart.into_result().unwrap().intraday_bars().is_empty());
  }
}
