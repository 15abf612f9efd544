//! WhatsApp reminder webhook.

use async_trait::async_trait;
use domain::{NotificationError, Order, OrderNotifier};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, instrument};

/// Header carrying the webhook API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Webhook endpoint and credentials.
#[derive(Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub api_key: SecretString,
    /// Identifies the laundry owner to the reminder service.
    pub owner_email: String,
}

impl WebhookConfig {
    /// Returns true when URL, key and owner are all present.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.api_key.expose_secret().trim().is_empty()
            && !self.owner_email.trim().is_empty()
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("owner_email", &self.owner_email)
            .finish()
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    phone: &'a str,
    message: String,
    owner_email: &'a str,
}

/// Sends order status messages to the configured webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    /// Creates a notifier with its own HTTP client.
    #[must_use]
    pub fn new(config: WebhookConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a notifier sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, config: WebhookConfig) -> Self {
        Self { client, config }
    }

    /// Returns true when the webhook can be called.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

#[async_trait]
impl OrderNotifier for WebhookNotifier {
    #[instrument(skip(self, order), fields(code = %order.code))]
    async fn notify(&self, order: &Order) -> Result<(), NotificationError> {
        if !self.config.is_configured() {
            return Err(NotificationError::NotConfigured);
        }

        let payload = WebhookPayload {
            phone: &order.customer_phone,
            message: order.status_message(),
            owner_email: &self.config.owner_email,
        };

        let result = self
            .client
            .post(&self.config.url)
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&payload)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                crate::record_outcome("webhook", false);
                return Err(NotificationError::Request(e.to_string()));
            }
        };

        let status = response.status();
        crate::record_outcome("webhook", status.is_success());
        if !status.is_success() {
            return Err(NotificationError::Status(status.as_u16()));
        }

        debug!(status = status.as_u16(), "webhook accepted notification");
        Ok(())
    }
}
