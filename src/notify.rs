// keydrop/src/notify.rs
// Operator SMS (Twilio) & purchaser email (EmailJS)

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::{EmailJsConfig, TwilioConfig};
use crate::order::PurchaseSummary;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Failure of one notification channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ChannelError(pub String);

pub type ChannelResult = std::result::Result<(), ChannelError>;

// ═══════════════════════════════════════════════════════════════════════════════
// MESSAGES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn sms_body(summary: &PurchaseSummary) -> String {
    format!(
        "New payment received! Payer: {}, Amount: {} {}",
        summary.payer_name, summary.amount, summary.currency
    )
}

/// Template parameters of the purchaser email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to_email: String,
    pub name: String,
    pub purchase_key: String,
    pub download_link: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHANNELS
// ═══════════════════════════════════════════════════════════════════════════════

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, body: &str) -> ChannelResult;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> ChannelResult;
}

pub struct TwilioSms {
    config: TwilioConfig,
    http_client: Client,
}

impl TwilioSms {
    pub fn new(config: TwilioConfig, http_client: Client) -> Self {
        Self { config, http_client }
    }
}

#[async_trait]
impl SmsSender for TwilioSms {
    async fn send_sms(&self, body: &str) -> ChannelResult {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.config.account_sid
        );
        let params = [
            ("To", self.config.operator_number.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let resp = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| ChannelError(format!("Twilio request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err_text = resp.text().await.unwrap_or_default();
            return Err(ChannelError(format!("Twilio failed: {} {}", status, err_text)));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct EmailJsPayload<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a EmailMessage,
}

pub struct EmailJsClient {
    config: EmailJsConfig,
    http_client: Client,
}

impl EmailJsClient {
    pub fn new(config: EmailJsConfig, http_client: Client) -> Self {
        Self { config, http_client }
    }
}

#[async_trait]
impl EmailSender for EmailJsClient {
    async fn send_email(&self, message: &EmailMessage) -> ChannelResult {
        let payload = EmailJsPayload {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: message,
        };

        let resp = self
            .http_client
            .post(EMAILJS_SEND_URL)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError(format!("EmailJS request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err_text = resp.text().await.unwrap_or_default();
            return Err(ChannelError(format!(
                "EmailJS failed: {} {}",
                status.as_u16(),
                err_text
            )));
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NOTIFIER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChannelOutcome {
    Sent,
    Failed { reason: String },
}

impl From<ChannelResult> for ChannelOutcome {
    fn from(result: ChannelResult) -> Self {
        match result {
            Ok(()) => ChannelOutcome::Sent,
            Err(e) => ChannelOutcome::Failed { reason: e.0 },
        }
    }
}

impl ChannelOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, ChannelOutcome::Sent)
    }
}

/// Per-channel outcome of one notification round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub sms: ChannelOutcome,
    pub email: ChannelOutcome,
}

impl NotificationReport {
    pub fn all_sent(&self) -> bool {
        self.sms.is_sent() && self.email.is_sent()
    }

    /// `channel: reason` for every failed channel, joined by `; `
    pub fn failure_summary(&self) -> String {
        [("sms", &self.sms), ("email", &self.email)]
            .into_iter()
            .filter_map(|(channel, outcome)| match outcome {
                ChannelOutcome::Sent => None,
                ChannelOutcome::Failed { reason } => Some(format!("{}: {}", channel, reason)),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Clone)]
pub struct Notifier {
    sms: Arc<dyn SmsSender>,
    email: Arc<dyn EmailSender>,
}

impl Notifier {
    pub fn new(sms: Arc<dyn SmsSender>, email: Arc<dyn EmailSender>) -> Self {
        Self { sms, email }
    }

    /// Send both notifications. Neither channel's failure stops the other.
    pub async fn notify(&self, summary: &PurchaseSummary, email: &EmailMessage) -> NotificationReport {
        let body = sms_body(summary);
        let (sms, email) = tokio::join!(self.sms.send_sms(&body), self.email.send_email(email));

        if let Err(e) = &sms {
            tracing::error!("[NOTIFY] SMS failed: {}", e);
        }
        if let Err(e) = &email {
            tracing::error!("[NOTIFY] email to {} failed: {}", summary.payer_email, e);
        }

        NotificationReport {
            sms: sms.into(),
            email: email.into(),
        }
    }
}
