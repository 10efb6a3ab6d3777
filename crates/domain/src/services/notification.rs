//! One-time login code delivery.
//!
//! Delivery is fire-and-forget: callers log the result and never surface it.

use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Message handed to the notifier.
#[derive(Debug, Clone, PartialEq)]
pub struct OneTimeCodeMessage {
    pub email: String,
    pub recipient_name: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationResult {
    Sent,
    /// Delivery is switched off in configuration.
    Skipped,
    /// Delivery failed; the login flow continues regardless.
    Failed(String),
}

#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_one_time_code(&self, message: OneTimeCodeMessage) -> NotificationResult;
}

/// Mock notifier for development and testing.
///
/// Keeps every message it was asked to deliver so tests can read the code.
#[derive(Debug, Default)]
pub struct MockNotificationService {
    pub simulate_failure: bool,
    sent: Mutex<Vec<OneTimeCodeMessage>>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OneTimeCodeMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// The most recent code sent to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.email == email)
            .map(|m| m.code)
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send_one_time_code(&self, message: OneTimeCodeMessage) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(email = %message.email, "Mock notifier simulating failure");
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            email = %message.email,
            expires_at = %message.expires_at,
            "Mock: Would send one-time code"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        NotificationResult::Sent
    }
}
