//! Report Viewer - Stored Reports by Date, Manual Re-send
//!
//! Reads back what the tracker and the gap scanner persisted for a
//! day and can hand it to the notifier again. Nothing is rewritten.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::domain::report::trend_subject;
use crate::domain::{GapReport, TrendEntry, render_trend_report};
use crate::ports::notifier::Notification;
use crate::ports::repository::ReportStore;

use super::error::TrackerError;
use super::report_emitter::{DeliveryStatus, ReportEmitter};

/// Everything stored for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDay {
  /// Report date.
  pub date: NaiveDate,
  /// Trend entries, Rising block first, if a trend report exists.
  pub trend: Option<Vec<TrendEntry>>,
  /// Gap report, if one exists.
  pub gaps: Option<GapReport>,
}

impl StoredDay {
  /// Whether nothing was stored for the date.
  pub fn is_empty(&self) -> bool {
    self.trend.is_none() && self.gaps.is_none()
  }

  /// Messages for the stored reports, trend first.
  pub fn notifications(&self) -> Vec<Notification> {
    let mut out = Vec::new();
    if let Some(entries) = &self.trend {
      out.push(Notification {
        subject: trend_subject(self.date),
        body: render_trend_report(self.date, entries),
      });
    }
    if let Some(report) = &self.gaps {
      out.push(Notification {
        subject: report.subject(),
        body: report.render_text(),
      });
    }
    out
  }

  /// Printable form of every stored report.
  pub fn render_text(&self) -> String {
    self
      .notifications()
      .into_iter()
      .map(|n| n.body)
      .collect::<Vec<_>>()
      .join("\n")
  }
}

/// Read-only access to persisted reports.
pub struct ReportViewer {
  store: Arc<dyn ReportStore>,
  emitter: Arc<ReportEmitter>,
}

impl ReportViewer {
  pub fn new(store: Arc<dyn ReportStore>, emitter: Arc<ReportEmitter>) -> Self {
    Self { store, emitter }
  }

  /// Dates with stored reports, newest first.
  ///
  /// # Errors
  /// Returns the store error if the report directory cannot be read.
  pub async fn dates(&self) -> Result<Vec<NaiveDate>, TrackerError> {
    Ok(self.store.stored_dates().await?)
  }

  /// Load both report kinds for `date`.
  ///
  /// # Errors
  /// Returns the store error for unreadable or malformed files.
  #[instrument(skip(self))]
  pub async fn load(&self, date: NaiveDate) -> Result<StoredDay, TrackerError> {
    let trend = self.store.load_session(date).await?;
    let gaps = self.store.load_gap_report(date).await?;
    info!(
      trend = trend.as_ref().map_or(0, Vec::len),
      gaps = gaps.as_ref().map_or(0, |g| g.signals.len()),
      "Stored reports loaded"
    );
    Ok(StoredDay { date, trend, gaps })
  }

  /// Send every stored report for the day again.
  pub async fn resend(&self, day: &StoredDay) -> Vec<DeliveryStatus> {
    let mut statuses = Vec::new();
    for notification in day.notifications() {
      statuses.push(self.emitter.deliver(&notification).await);
    }
    info!(date = %day.date, sent = statuses.len(), "Stored reports re-sent");
    statuses
  }
}
