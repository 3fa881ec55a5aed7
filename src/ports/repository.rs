//! Repository Port - Per-day Report Persistence Interface
//!
//! One tabular file per report kind per calendar day. Saving over an
//! existing day is refused unless the caller explicitly allows it.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{GapReport, SessionResult, TrendEntry};

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
  /// A new file was written.
  Created(PathBuf),
  /// An existing file was replaced (explicit re-run).
  Overwritten(PathBuf),
}

impl SaveOutcome {
  /// Path that was written.
  pub fn path(&self) -> &PathBuf {
    match self {
      Self::Created(p) | Self::Overwritten(p) => p,
    }
  }
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
  /// A report for this date is already on disk and overwrite was not allowed.
  #[error("report already exists at {0}; rerun with overwrite enabled to replace it")]
  AlreadyExists(PathBuf),
  /// A stored report could not be parsed.
  #[error("malformed report {path} line {line}: {reason}")]
  Malformed {
    path: PathBuf,
    line: usize,
    reason: String,
  },
  /// Underlying I/O failure.
  #[error("report I/O failed: {0}")]
  Io(#[from] std::io::Error),
}

/// Trait for report persistence providers.
#[async_trait]
pub trait ReportStore: Send + Sync + 'static {
  /// Persist a finalized trend session keyed by its session date.
  async fn save_session(
    &self,
    result: &SessionResult,
    overwrite: bool,
  ) -> Result<SaveOutcome, StoreError>;

  /// Path of the trend report already stored for `date`, if any.
  async fn existing_session(&self, date: NaiveDate) -> Result<Option<PathBuf>, StoreError>;

  /// Load the trend entries stored for a date, if any.
  async fn load_session(&self, date: NaiveDate) -> Result<Option<Vec<TrendEntry>>, StoreError>;

  /// Persist a gap report keyed by its date.
  async fn save_gap_report(&self, report: &GapReport, overwrite: bool) -> Result<SaveOutcome, StoreError>;

  /// Load the gap report stored for a date, if any.
  async fn load_gap_report(&self, date: NaiveDate) -> Result<Option<GapReport>, StoreError>;

  /// Dates with at least one stored report, newest first.
  async fn stored_dates(&self) -> Result<Vec<NaiveDate>, StoreError>;

  /// Check if the store is writable.
  async fn is_healthy(&self) -> bool;
}
