//! Notification sink for alert payloads
//!
//! Delivery failures are recoverable: the caller logs them and continues,
//! so a dead webhook endpoint never stalls the replay cursor.

use super::payload::AlertPayload;
use async_trait::async_trait;
use log::info;
use std::time::Duration;

#[derive(Debug)]
pub enum DeliveryError {
    /// Request could not be sent or timed out in flight
    Http(reqwest::Error),
    /// HTTP client could not be constructed
    Client(reqwest::Error),
    /// Non-HTTP sink refused the payload
    Sink(String),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::Http(e) => write!(f, "Webhook delivery failed: {}", e),
            DeliveryError::Client(e) => write!(f, "Webhook client setup failed: {}", e),
            DeliveryError::Sink(msg) => write!(f, "Notification sink failed: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Sink trait for pushing one alert payload per run
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver the payload to the sink
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError>;

    /// Get sink type for logging
    fn sink_type(&self) -> &'static str;
}

/// HTTP sink POSTing the payload as JSON to a webhook endpoint
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeliveryError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(DeliveryError::Http)?;

        // Any HTTP response counts as delivered; the status is informational
        info!("Webhook status: {}", response.status().as_u16());
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "webhook"
    }
}
