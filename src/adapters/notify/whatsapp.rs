//! WhatsApp Notifier - Twilio Messages API
//!
//! Posts the rendered report as one WhatsApp message through the
//! Twilio REST API. Credentials come from environment variables
//! (TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN), never from config files.
//!
//! A send is not retried: a timed-out request may still have been
//! delivered, and a duplicate report is worse than a missing one.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::ports::notifier::{Notification, Notifier};

/// Twilio account credentials.
pub struct TwilioCredentials {
    /// Account SID from TWILIO_ACCOUNT_SID.
    pub account_sid: String,
    /// Auth token from TWILIO_AUTH_TOKEN (sent only as basic auth).
    auth_token: String,
}

impl TwilioCredentials {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Load credentials from environment variables.
    ///
    /// Required env vars: TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN.
    pub fn from_env() -> Result<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .context("TWILIO_ACCOUNT_SID not set")?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .context("TWILIO_AUTH_TOKEN not set")?;
        Ok(Self::new(account_sid, auth_token))
    }
}

/// Message resource returned on success.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Error body returned on failure.
#[derive(Debug, Deserialize)]
struct TwilioError {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

/// Sends reports to one WhatsApp recipient.
pub struct WhatsAppNotifier {
    http: Client,
    credentials: TwilioCredentials,
    base_url: String,
    from: String,
    to: String,
}

impl WhatsAppNotifier {
    /// Create a notifier. `from` and `to` are `whatsapp:+<number>`.
    pub fn new(
        credentials: TwilioCredentials,
        base_url: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            from: with_channel_prefix(from.into()),
            to: with_channel_prefix(to.into()),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }

    fn form(&self, notification: &Notification) -> [(&'static str, String); 3] {
        [
            ("From", self.from.clone()),
            ("To", self.to.clone()),
            ("Body", notification.body.clone()),
        ]
    }
}

/// Twilio routes WhatsApp traffic by the `whatsapp:` address prefix.
fn with_channel_prefix(number: String) -> String {
    if number.starts_with("whatsapp:") {
        number
    } else {
        format!("whatsapp:{number}")
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&self.form(notification))
            .send()
            .await
            .context("Twilio request failed")?;

        let status = response.status();
        if status.is_success() {
            let message: MessageResource = response
                .json()
                .await
                .context("Malformed Twilio response")?;
            debug!(sid = %message.sid, status = ?message.status, "WhatsApp message queued");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<TwilioError>(&body) {
            Ok(err) => Err(anyhow::anyhow!(
                "Twilio error {status} (code {}): {}",
                err.code.map_or_else(|| "n/a".to_string(), |c| c.to_string()),
                err.message
            )),
            Err(_) => Err(anyhow::anyhow!("Twilio error {status}: {body}")),
        }
    }

    fn name(&self) -> &'static str {
        "whatsapp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> WhatsAppNotifier {
        WhatsAppNotifier::new(
            TwilioCredentials::new("AC123", "secret"),
            "https://api.twilio.com/",
            "+14155238886",
            "whatsapp:+919800000000",
        )
        .unwrap()
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            notifier().messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_form_prefixes_numbers_and_carries_body() {
        let note = Notification {
            subject: "s".to_string(),
            body: "📈 Rising:\nTCS: 1.00% (Rising)".to_string(),
        };
        let form = notifier().form(&note);
        assert_eq!(form[0], ("From", "whatsapp:+14155238886".to_string()));
        assert_eq!(form[1], ("To", "whatsapp:+919800000000".to_string()));
        assert_eq!(form[2].1, note.body);
    }
}
