//! Configuration Module - TOML-based Tracker Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Secrets (Twilio credentials) come from environment variables,
//! never from the file. The poll cadence and the tracking cutoff
//! are fixed in `domain::market_time` and are not configurable.

pub mod loader;

use serde::Deserialize;

use crate::domain::instrument::{self, Symbol};

/// Top-level configuration.
///
/// Loaded from `config.toml` at startup. Every section has defaults,
/// so an empty file yields a working NIFTY 50 tracker that logs its
/// reports instead of sending them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Tracker identity and universe.
  pub tracker: TrackerConfig,
  /// Quote provider endpoint and retry policy.
  pub quotes: QuotesConfig,
  /// Report persistence.
  pub persistence: PersistenceConfig,
  /// Report delivery.
  pub notifications: NotificationConfig,
  /// Health, metrics and board endpoints.
  pub server: ServerConfig,
}

/// Tracker identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  /// Human-readable name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Instruments to track, in display order.
  pub universe: Vec<Symbol>,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      name: "nifty-trend-tracker".to_string(),
      log_level: default_log_level(),
      universe: instrument::nifty_50(),
    }
  }
}

/// Quote provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
  /// Chart API base URL.
  pub base_url: String,
  /// Per-request timeout in seconds.
  pub timeout_seconds: u64,
  /// Retries per symbol on transient errors.
  pub max_retries: u32,
  /// Base backoff delay in milliseconds (doubled per retry).
  pub retry_base_delay_ms: u64,
  /// Request pacing across the whole batch.
  pub requests_per_second: u32,
  /// Daily bars requested per symbol by the gap scanner.
  pub daily_lookback_days: u32,
}

impl Default for QuotesConfig {
  fn default() -> Self {
    Self {
      base_url: "https://query1.finance.yahoo.com".to_string(),
      timeout_seconds: 10,
      max_retries: 3,
      retry_base_delay_ms: 200,
      requests_per_second: 10,
      daily_lookback_days: 5,
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
  /// Directory for per-day CSV reports.
  pub data_dir: String,
  /// Directory for HTML gap reports.
  pub reports_dir: String,
  /// Allow replacing an existing report for the same day.
  pub overwrite_existing: bool,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: "data".to_string(),
      reports_dir: "reports".to_string(),
      overwrite_existing: false,
    }
  }
}

/// Delivery channel for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
  /// Write the report to the log only.
  #[default]
  Log,
  /// Send via Twilio WhatsApp.
  Whatsapp,
}

/// Notification configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
  /// Send notifications at all.
  pub enabled: bool,
  /// Transport.
  pub channel: NotificationChannel,
  /// Twilio API base URL.
  pub twilio_base_url: String,
  /// Sender, e.g. `whatsapp:+14155238886`.
  pub whatsapp_from: String,
  /// Recipient, e.g. `whatsapp:+919800000000`.
  pub whatsapp_to: String,
}

impl Default for NotificationConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      channel: NotificationChannel::Log,
      twilio_base_url: "https://api.twilio.com".to_string(),
      whatsapp_from: String::new(),
      whatsapp_to: String::new(),
    }
  }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Serve /live, /ready, /board and /metrics.
  pub enabled: bool,
  /// Bind address.
  pub bind_address: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: "0.0.0.0:9090".to_string(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}
