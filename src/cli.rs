//! Command-line interface.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
  /// Path to the TOML configuration file
  #[arg(short, long, default_value = "config.toml")]
  pub config: String,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Track post-open trends until the cutoff, then report
  Track {
    /// Comma-separated symbols overriding the configured universe
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,
    /// Replace today's report if one already exists
    #[arg(long, default_value_t = false)]
    overwrite: bool,
  },
  /// Scan for opening gaps against yesterday's range
  GapScan {
    /// Replace today's report if one already exists
    #[arg(long, default_value_t = false)]
    overwrite: bool,
  },
  /// Screen for instruments at the day's high or low
  Screen,
  /// Show stored reports for a date, optionally sending them again
  Report {
    /// Report date (YYYY-MM-DD); the newest stored date when omitted
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Send the stored reports through the configured notifier
    #[arg(long, default_value_t = false)]
    send: bool,
  },
}

impl Cli {
  /// The requested command, `track` when none was given.
  pub fn command(&self) -> Command {
    self.command.clone().unwrap_or(Command::Track {
      symbols: Vec::new(),
      overwrite: false,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_to_track() {
    let cli = Cli::parse_from(["nifty-trend-tracker"]);
    assert_eq!(cli.config, "config.toml");
    assert!(matches!(cli.command(), Command::Track { overwrite: false, .. }));
  }

  #[test]
  fn test_track_symbols_are_split() {
    let cli = Cli::parse_from(["ntt", "track", "--symbols", "TCS.NS,INFY.NS", "--overwrite"]);
    assert_eq!(
      cli.command(),
      Command::Track {
        symbols: vec!["TCS.NS".to_string(), "INFY.NS".to_string()],
        overwrite: true,
      }
    );
  }

  #[test]
  fn test_gap_scan_subcommand() {
    let cli = Cli::parse_from(["ntt", "-c", "other.toml", "gap-scan"]);
    assert_eq!(cli.config, "other.toml");
    assert_eq!(cli.command(), Command::GapScan { overwrite: false });
  }

  #[test]
  fn test_report_subcommand() {
    let cli = Cli::parse_from(["ntt", "report", "--date", "2026-03-02", "--send"]);
    assert_eq!(
      cli.command(),
      Command::Report {
        date: NaiveDate::from_ymd_opt(2026, 3, 2),
        send: true,
      }
    );
    assert_eq!(
      Cli::parse_from(["ntt", "report"]).command(),
      Command::Report { date: None, send: false }
    );
    assert!(Cli::try_parse_from(["ntt", "report", "--date", "02/03/2026"]).is_err());
  }
}
