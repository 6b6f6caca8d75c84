// src/notify/mod.rs
//! Fan-out of new listings to the enabled channels.

pub mod email;
pub mod format;
pub mod slack;

use std::fmt;

use async_trait::async_trait;
use tracing::info;

use crate::config::AppConfig;
use crate::error::DispatchError;
use crate::ingest::types::Listing;

pub use email::{EmailNotifier, MailTransport, SmtpMailer};
pub use slack::SlackNotifier;

/// Delivery mechanisms. Declaration order is dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Chat,
    Email,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Chat => f.write_str("slack"),
            Channel::Email => f.write_str("email"),
        }
    }
}

/// What every channel gets to render: the search it came from and the new listings.
#[derive(Debug, Clone, Copy)]
pub struct NotificationBatch<'a> {
    pub query: &'a str,
    pub location: &'a str,
    pub listings: &'a [Listing],
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;
    async fn send(&self, batch: &NotificationBatch<'_>) -> Result<(), DispatchError>;
}

pub struct NotificationDispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotificationDispatcher {
    /// Notifiers are ordered by channel (chat first), whatever order they come in.
    pub fn new(mut notifiers: Vec<Box<dyn Notifier>>) -> Self {
        notifiers.sort_by_key(|n| n.channel());
        Self { notifiers }
    }

    /// Production notifiers for every channel enabled in `notify_via`.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
        if cfg.notify_via.slack {
            notifiers.push(Box::new(SlackNotifier::new(cfg.slack.clone())));
        }
        if cfg.notify_via.email {
            notifiers.push(Box::new(EmailNotifier::new(
                cfg.email.clone(),
                SmtpMailer::from_config(&cfg.email),
            )));
        }
        Self::new(notifiers)
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.notifiers.iter().map(|n| n.channel()).collect()
    }

    /// Send through each channel in order. The first failure is returned as
    /// is and later channels are not attempted; no retries.
    pub async fn dispatch(&self, batch: &NotificationBatch<'_>) -> Result<Vec<Channel>, DispatchError> {
        let mut sent = Vec::with_capacity(self.notifiers.len());
        for notifier in &self.notifiers {
            notifier.send(batch).await?;
            info!(
                channel = %notifier.channel(),
                listings = batch.listings.len(),
                "notification sent"
            );
            sent.push(notifier.channel());
        }
        Ok(sent)
    }
}
