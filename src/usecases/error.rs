//! Tracker Errors - Operator-facing Failure Taxonomy
//!
//! Transient fetch failures never appear here: the polling loop
//! absorbs them. These are the failures an operator must act on.

use thiserror::Error;

use crate::ports::repository::StoreError;

/// Failures surfaced by tracker controls.
#[derive(Debug, Error)]
pub enum TrackerError {
  /// `start` was called with no instruments.
  #[error("cannot start tracking: the universe is empty")]
  EmptyUniverse,
  /// The quote source produced no usable price for any instrument.
  #[error(
    "cannot start tracking: no prices for any of {universe} instruments ({reason}); \
     check connectivity and market hours, then start again"
  )]
  SessionStart {
    /// Universe size.
    universe: usize,
    /// Why the capture came back empty.
    reason: String,
  },
  /// A newer `start` replaced this session while its baseline was being captured.
  #[error("session start superseded by a newer start")]
  Superseded,
  /// `run` or `finalize` was called before a successful `start`.
  #[error("no armed session: call start first")]
  NotStarted,
  /// Persisting the result failed; the session stays unfinalized.
  #[error("failed to persist report: {0}")]
  Store(#[from] StoreError),
}
