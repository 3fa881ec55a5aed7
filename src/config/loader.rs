//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, NotificationChannel};

/// Upper bound on quote retries; backoff doubles per attempt.
const MAX_QUOTE_RETRIES: u32 = 10;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    universe = config.tracker.universe.len(),
    channel = ?config.notifications.channel,
    data_dir = %config.persistence.data_dir,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty, non-blank universe
/// - Positive request pacing and timeouts
/// - Bounded retry count
/// - Lookback long enough to compare two sessions
/// - WhatsApp numbers when that channel is selected
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.tracker.universe.is_empty(),
    "At least one instrument must be configured"
  );

  for (i, symbol) in config.tracker.universe.iter().enumerate() {
    anyhow::ensure!(
      !symbol.trim().is_empty(),
      "Universe entry {} is blank",
      i
    );
  }

  anyhow::ensure!(
    !config.quotes.base_url.is_empty(),
    "Quote base_url must not be empty"
  );
  anyhow::ensure!(
    config.quotes.timeout_seconds > 0,
    "Quote timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.quotes.requests_per_second > 0,
    "requests_per_second must be positive, got {}",
    config.quotes.requests_per_second
  );
  anyhow::ensure!(
    config.quotes.max_retries <= MAX_QUOTE_RETRIES,
    "quotes.max_retries must be at most {}, got {}",
    MAX_QUOTE_RETRIES,
    config.quotes.max_retries
  );
  anyhow::ensure!(
    config.quotes.daily_lookback_days >= 2,
    "daily_lookback_days must be at least 2, got {}",
    config.quotes.daily_lookback_days
  );

  anyhow::ensure!(
    !config.persistence.data_dir.is_empty(),
    "persistence.data_dir must not be empty"
  );

  if config.notifications.enabled
    && config.notifications.channel == NotificationChannel::Whatsapp
  {
    anyhow::ensure!(
      !config.notifications.whatsapp_from.is_empty()
        && !config.notifications.whatsapp_to.is_empty(),
      "whatsapp_from and whatsapp_to are required for the whatsapp channel"
    );
  }

  Ok(())
}
