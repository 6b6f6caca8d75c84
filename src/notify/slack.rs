// src/notify/slack.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::format::chat_chunks;
use super::{Channel, NotificationBatch, Notifier};
use crate::config::SlackConfig;
use crate::error::DispatchError;

const ICON_EMOJI: &str = ":robot_face:";

/// Slack Web API reply envelope.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackNotifier {
    cfg: SlackConfig,
    client: Client,
}

impl SlackNotifier {
    pub fn new(cfg: SlackConfig) -> Self {
        Self {
            cfg,
            client: Client::new(),
        }
    }

    /// Swap in a preconfigured client (timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.cfg.api_url.trim_end_matches('/'), method)
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<ApiReply, DispatchError> {
        let reply = self
            .client
            .post(self.endpoint(method))
            .bearer_auth(&self.cfg.token)
            .json(&body)
            .send()
            .await?
            .json::<ApiReply>()
            .await?;
        Ok(reply)
    }

    /// `api.test` liveness probe; a not-ok reply aborts before anything is posted.
    pub async fn probe(&self) -> Result<(), DispatchError> {
        let reply = self.call("api.test", serde_json::json!({})).await?;
        if !reply.ok {
            let reason = reply.error.unwrap_or_else(|| "unknown error".to_string());
            return Err(DispatchError::ChatConfigError(format!("ERROR: {reason}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn channel(&self) -> Channel {
        Channel::Chat
    }

    async fn send(&self, batch: &NotificationBatch<'_>) -> Result<(), DispatchError> {
        let chunks = chat_chunks(batch.listings);

        self.probe().await?;

        for (i, text) in chunks.iter().enumerate() {
            let body = serde_json::json!({
                "channel": self.cfg.channel,
                "text": text,
                "icon_emoji": ICON_EMOJI,
            });
            let reply = self.call("chat.postMessage", body).await?;
            if !reply.ok {
                tracing::warn!(
                    chunk = i + 1,
                    error = reply.error.as_deref().unwrap_or("unknown"),
                    "slack rejected message chunk"
                );
            }
        }
        Ok(())
    }
}
