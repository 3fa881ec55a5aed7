//! Market Data HTTP Client - Rate-limited REST Client
//!
//! Wraps reqwest with request pacing, retries, and exponential
//! backoff for the chart endpoint serving prices and bars.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::QuotesConfig;

/// Browser-like agent; the chart endpoint rejects empty agents.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) nifty-trend-tracker";

/// Configuration for the market data client.
#[derive(Debug, Clone)]
pub struct QuoteClientConfig {
  /// Base URL of the chart API.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
  /// Request pacing across all callers.
  pub requests_per_second: u32,
}

impl Default for QuoteClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://query1.finance.yahoo.com".to_string(),
      timeout: Duration::from_secs(10),
      max_retries: 3,
      retry_base_delay: Duration::from_millis(200),
      requests_per_second: 10,
    }
  }
}

impl From<&QuotesConfig> for QuoteClientConfig {
  fn from(cfg: &QuotesConfig) -> Self {
    Self {
      base_url: cfg.base_url.clone(),
      timeout: Duration::from_secs(cfg.timeout_seconds),
      max_retries: cfg.max_retries,
      retry_base_delay: Duration::from_millis(cfg.retry_base_delay_ms),
      requests_per_second: cfg.requests_per_second,
    }
  }
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt - 1)`, saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
  base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Rate-limited HTTP client for the chart API.
pub struct QuoteClient {
  /// Underlying HTTP client.
  http: Client,
  /// Parsed base URL.
  base_url: Url,
  /// Client configuration.
  config: QuoteClientConfig,
  /// Request pacing.
  limiter: DefaultDirectRateLimiter,
}

impl QuoteClient {
  /// Create a new client.
  pub fn new(config: QuoteClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .user_agent(USER_AGENT)
      .pool_max_idle_per_host(10)
      .build()
      .context("Failed to build HTTP client")?;

    let base_url = Url::parse(&config.base_url)
      .with_context(|| format!("Invalid quote base URL: {}", config.base_url))?;

    let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
    let limiter = RateLimiter::direct(Quota::per_second(rps));

    Ok(Self {
      http,
      base_url,
      config,
      limiter,
    })
  }

  /// Build `{base}/v8/finance/chart/{symbol}?range=..&interval=..`.
  pub fn chart_url(&self, symbol: &str, range: &str, interval: &str) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|()| anyhow::anyhow!("Quote base URL cannot carry a path"))?
      .pop_if_empty()
      .extend(["v8", "finance", "chart", symbol]);
    url
      .query_pairs_mut()
      .append_pair("range", range)
      .append_pair("interval", interval);
    Ok(url)
  }

  /// GET `url` and decode the JSON body, with pacing and retries.
  pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = backoff_delay(self.config.retry_base_delay, attempt);
        debug!(attempt, delay_ms = delay.as_millis(), "Retrying request");
        sleep(delay).await;
      }

      self.limiter.until_ready().await;

      match self.http.get(url.clone()).send().await {
        Ok(response) => match response.status() {
          StatusCode::OK => {
            return response
              .json::<T>()
              .await
              .with_context(|| format!("Malformed response from {}", url.path()));
          }
          StatusCode::TOO_MANY_REQUESTS => {
            warn!(path = url.path(), "Rate limited by quote API, backing off");
            last_error = Some(anyhow::anyhow!("Rate limited"));
          }
          status if status.is_server_error() => {
            warn!(status = %status, path = url.path(), "Server error, retrying");
            last_error = Some(anyhow::anyhow!("Server error: {status}"));
          }
          status => {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Quote API error {status}: {body}"));
          }
        },
        Err(e) => {
          warn!(error = %e, attempt, path = url.path(), "Request failed");
          last_error = Some(e.into());
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_chart_url_for_symbol() {
    let client = QuoteClient::new(QuoteClientConfig::default()).unwrap();
    let url = client.chart_url("M&M.NS", "1d", "1m").unwrap();
    assert_eq!(
      url.as_str(),
      "https://query1.finance.yahoo.com/v8/finance/chart/M&M.NS?range=1d&interval=1m"
    );
  }

  #[test]
  fn test_chart_url_keeps_base_path() {
    let config = QuoteClientConfig {
      base_url: "http://localhost:8080/proxy/".to_string(),
      ..QuoteClientConfig::default()
    };
    let client = QuoteClient::new(config).unwrap();
    let url = client.chart_url("TCS.NS", "5d", "1d").unwrap();
    assert_eq!(url.path(), "/proxy/v8/finance/chart/TCS.NS");
  }

  #[test]
  fn test_backoff_doubles_and_saturates() {
    let base = Duration::from_millis(200);
    assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
    assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
    assert_eq!(backoff_delay(base, 40), base.saturating_mul(u32::MAX));
  }

  #[test]
  fn test_zero_rps_does_not_panic() {
    let config = QuoteClientConfig {
      requests_per_second: 0,
      ..QuoteClientConfig::default()
    };
    assert!(QuoteClient::new(config).is_ok());
  }
}
