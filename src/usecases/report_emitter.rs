//! Report Emitter - Finalize, Persist and Notify
//!
//! Finalize flow:
//! 1. Take the session write lock (one finalize at a time)
//! 2. If already finalized, return the stored result (no-op)
//! 3. Build the result and persist it keyed by session date
//! 4. Mark the session finalized
//! 5. Notify; a delivery failure is reported, never rolled back
//!
//! The same emitter publishes gap-scan reports.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::domain::{GapReport, Session, SessionResult};
use crate::ports::notifier::{Notification, Notifier};
use crate::ports::repository::{ReportStore, SaveOutcome, StoreError};

use super::error::TrackerError;

/// Result of handing a report to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
  /// The notifier accepted the message.
  Delivered,
  /// Notifications are turned off.
  Disabled,
  /// Delivery failed; the report is still persisted.
  Failed(String),
}

impl DeliveryStatus {
  /// Whether the message went out.
  pub fn is_delivered(&self) -> bool {
    matches!(self, Self::Delivered)
  }
}

/// What a finalize call did.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
  /// This call built, persisted and dispatched the result.
  Finalized {
    /// The immutable result.
    result: SessionResult,
    /// Where it was written.
    saved: SaveOutcome,
    /// Notification outcome.
    delivery: DeliveryStatus,
  },
  /// An earlier call already finalized this session.
  AlreadyFinalized(SessionResult),
}

impl FinalizeOutcome {
  /// The session result, however it was obtained.
  pub fn result(&self) -> &SessionResult {
    match self {
      Self::Finalized { result, .. } | Self::AlreadyFinalized(result) => result,
    }
  }
}

/// Persists and dispatches finalized reports.
pub struct ReportEmitter {
  /// Per-day report store.
  store: Arc<dyn ReportStore>,
  /// Delivery transport; `None` disables notifications.
  notifier: Option<Arc<dyn Notifier>>,
  /// Allow replacing an existing report for the same date.
  overwrite: bool,
}

impl ReportEmitter {
  /// Create an emitter.
  pub fn new(
    store: Arc<dyn ReportStore>,
    notifier: Option<Arc<dyn Notifier>>,
    overwrite: bool,
  ) -> Self {
    Self {
      store,
      notifier,
      overwrite,
    }
  }

  /// Refuse to start a session whose report could not be saved.
  ///
  /// # Errors
  /// `Store(AlreadyExists)` when a report for `date` is on disk and
  /// overwrite is off; `Store` when the store cannot be queried.
  pub async fn ensure_session_slot(&self, date: NaiveDate) -> Result<(), TrackerError> {
    if self.overwrite {
      return Ok(());
    }
    match self.store.existing_session(date).await? {
      Some(path) => {
        warn!(path = %path.display(), "A report for this date already exists");
        Err(StoreError::AlreadyExists(path).into())
      }
      None => Ok(()),
    }
  }

  /// Finalize the session exactly once.
  ///
  /// # Errors
  /// `NotStarted` for a session without baselines, `Store` if the
  /// report could not be written. In both cases the session stays
  /// unfinalized and the call may be retried.
  #[instrument(skip(self, session))]
  pub async fn finalize(
    &self,
    session: &RwLock<Session>,
    now: DateTime<Utc>,
  ) -> Result<FinalizeOutcome, TrackerError> {
    let mut guard = session.write().await;

    if let Some(result) = guard.result() {
      info!(session_id = %result.session_id, "Session already finalized, skipping");
      return Ok(FinalizeOutcome::AlreadyFinalized(result.clone()));
    }
    if !guard.is_armed() {
      return Err(TrackerError::NotStarted);
    }

    let result = guard.build_result(now);
    let saved = self.store.save_session(&result, self.overwrite).await?;
    if let SaveOutcome::Overwritten(path) = &saved {
      warn!(path = %path.display(), "Replaced an existing report for this date");
    }
    guard.mark_finalized(result.clone());
    drop(guard);

    info!(
      session_id = %result.session_id,
      date = %result.session_date,
      rising = result.rising().count(),
      falling = result.falling().count(),
      path = %saved.path().display(),
      "Session finalized"
    );

    let notification = Notification {
      subject: result.subject(),
      body: result.render_text(),
    };
    let delivery = self.deliver(&notification).await;

    Ok(FinalizeOutcome::Finalized {
      result,
      saved,
      delivery,
    })
  }

  /// Persist and announce a gap report.
  ///
  /// An empty report is neither saved nor sent.
  ///
  /// # Errors
  /// Returns the store error if the report could not be written.
  #[instrument(skip(self, report), fields(date = %report.date))]
  pub async fn publish_gap_report(
    &self,
    report: &GapReport,
  ) -> Result<Option<(SaveOutcome, DeliveryStatus)>, TrackerError> {
    if report.is_empty() {
      info!("No breakouts today");
      return Ok(None);
    }

    let saved = self.store.save_gap_report(report, self.overwrite).await?;
    info!(
      gaps = report.signals.len(),
      path = %saved.path().display(),
      "Gap report saved"
    );

    let notification = Notification {
      subject: report.subject(),
      body: report.render_text(),
    };
    let delivery = self.deliver(&notification).await;
    Ok(Some((saved, delivery)))
  }

  /// Hand one message to the notifier. Failures are reported, not raised.
  pub async fn deliver(&self, notification: &Notification) -> DeliveryStatus {
    let Some(notifier) = &self.notifier else {
      return DeliveryStatus::Disabled;
    };

    match notifier.notify(notification).await {
      Ok(()) => {
        info!(transport = notifier.name(), "Notification delivered");
        DeliveryStatus::Delivered
      }
      Err(e) => {
        warn!(
          transport = notifier.name(),
          error = %e,
          "Notification delivery failed; report remains persisted"
        );
        DeliveryStatus::Failed(e.to_string())
      }
    }
  }
}
