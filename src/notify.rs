use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::error::Error as StdError;
use url::Url;

use crate::models::chat::LeadNotification;

/// Source tag stamped on every notification so the receiving end can
/// tell this integration apart from other feeds.
pub const NOTIFICATION_SOURCE: &str = "concierge-agent";

/// Outbound sink for lead notifications. Delivery is best effort: the
/// agent logs a failed send and moves on, it never reaches the visitor.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(
        &self,
        notification: &LeadNotification
    ) -> Result<(), Box<dyn StdError + Send + Sync>>;
}

pub struct WebhookNotifier {
    http: HttpClient,
    target: Url,
}

impl WebhookNotifier {
    pub fn new(target_url: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let target = Url::parse(target_url)
            .map_err(|e| format!("Invalid lead webhook URL '{}': {}", target_url, e))?;
        Ok(Self {
            http: HttpClient::new(),
            target,
        })
    }
}

#[async_trait]
impl LeadNotifier for WebhookNotifier {
    async fn notify(
        &self,
        notification: &LeadNotification
    ) -> Result<(), Box<dyn StdError + Send + Sync>> {
        self.http
            .post(self.target.clone())
            .json(notification)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
