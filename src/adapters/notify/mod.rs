//! Notification Adapters
//!
//! - `log`: Report to the tracing log
//! - `whatsapp`: Report via Twilio WhatsApp

pub mod log;
pub mod whatsapp;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{NotificationChannel, NotificationConfig};
use crate::ports::notifier::Notifier;

pub use self::log::LogNotifier;
pub use whatsapp::{TwilioCredentials, WhatsAppNotifier};

/// Build the configured transport, or `None` when disabled.
pub fn build_notifier(cfg: &NotificationConfig) -> Result<Option<Arc<dyn Notifier>>> {
  if !cfg.enabled {
    return Ok(None);
  }

  let notifier: Arc<dyn Notifier> = match cfg.channel {
    NotificationChannel::Log => Arc::new(LogNotifier),
    NotificationChannel::Whatsapp => Arc::new(WhatsAppNotifier::new(
      TwilioCredentials::from_env()?,
      cfg.twilio_base_url.clone(),
      cfg.whatsapp_from.clone(),
      cfg.whatsapp_to.clone(),
    )?),
  };
  Ok(Some(notifier))
}
