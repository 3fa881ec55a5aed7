//! Notifier Port - Outbound Report Delivery
//!
//! Delivery failures are reported to the caller but never undo a
//! finalize or a persisted report.

use async_trait::async_trait;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  /// Subject / headline.
  pub subject: String,
  /// Full message body.
  pub body: String,
}

/// Trait for notification transports.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
  /// Deliver one message.
  async fn notify(&self, notification: &Notification) -> anyhow::Result<()>;

  /// Transport name for logs and metrics labels.
  fn name(&self) -> &'static str;
}
