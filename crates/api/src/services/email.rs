//! One-time code delivery by email.
//!
//! Supported providers:
//! - `console`: logs the message instead of sending it (development)

use async_trait::async_trait;
use domain::services::{NotificationResult, NotificationService, OneTimeCodeMessage};
use tracing::{debug, error, info};

use crate::config::EmailConfig;

/// Email message to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
}

impl EmailMessage {
    pub fn one_time_code(message: &OneTimeCodeMessage) -> Self {
        let body_text = format!(
            r#"Hi {name},

Your login code is {code}.

The code expires at {expires} UTC. If you did not try to sign in, you can ignore this email.

Patrol Operations"#,
            name = message.recipient_name,
            code = message.code,
            expires = message.expires_at.format("%H:%M:%S"),
        );

        Self {
            to: message.email.clone(),
            to_name: Some(message.recipient_name.clone()),
            subject: "Your login code".to_string(),
            body_text,
        }
    }
}

/// Notifier backed by the configured email provider.
#[derive(Debug, Clone)]
pub struct ConsoleNotificationService {
    config: EmailConfig,
}

impl ConsoleNotificationService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );
        debug!(body = %message.body_text, "Email body");
    }
}

#[async_trait]
impl NotificationService for ConsoleNotificationService {
    async fn send_one_time_code(&self, message: OneTimeCodeMessage) -> NotificationResult {
        let email = EmailMessage::one_time_code(&message);

        if !self.config.enabled {
            debug!(to = %email.to, "Email service disabled, skipping send");
            return NotificationResult::Skipped;
        }

        match self.config.provider.as_str() {
            "console" => {
                self.send_console(&email);
                NotificationResult::Sent
            }
            provider => {
                error!(provider = %provider, "Unknown email provider");
                NotificationResult::Failed(format!("Unknown email provider: {}", provider))
            }
        }
    }
}
