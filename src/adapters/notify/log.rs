//! Log-only notifier. Writes the rendered report to the tracing log.

use async_trait::async_trait;
use tracing::info;

use crate::ports::notifier::{Notification, Notifier};

/// Notifier that emits the report as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(
            subject = %notification.subject,
            body = %notification.body,
            "Report"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
