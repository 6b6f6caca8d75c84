// tests/common/mod.rs
// Shared fixtures and mock notifiers for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use jobnotify::config::{
    AppConfig, EmailConfig, IndeedConfig, NotifyVia, SlackConfig, DEFAULT_SMTP_HOST,
    DEFAULT_SMTP_PORT,
};
use jobnotify::{Channel, DispatchError, Listing, NotificationBatch, Notifier};

pub fn listing(id: &str, title: &str, company: &str, snippet: &str) -> Listing {
    Listing {
        id: id.to_string(),
        company: company.to_string(),
        date_created: "Mon, 10 Jul 2017 10:00:00 GMT".to_string(),
        description: snippet.to_string(),
        title: title.to_string(),
        latitude: Some(53.34),
        location: "Dublin".to_string(),
        longitude: Some(-6.26),
        url: format!("http://ie.indeed.com/viewjob?jk={id}"),
    }
}

/// The two listings used throughout the message tests.
pub fn sample_listings() -> Vec<Listing> {
    vec![
        listing(
            "4da3f3ec1f781a3f",
            "Lead Data Scientist",
            "Brightwater Group",
            "Our client, a major, international banking brand, currently has a job opening \
             for a lead data scientist. As a lead data Scientist sitting within the banks...",
        ),
        listing(
            "e90a42701d1d29ec",
            "Research Fellow (Data Science/Biomedical Engineering)",
            "Trinity College Dublin",
            "The investigator will join a vibrant inter-disciplinary team - including \
             epidemiologists, biostatisticians, economists, social scientists, biomedical engineers...",
        ),
    ]
}

/// `n` listings whose text holds no `\d1.` pattern outside the entry numbers.
pub fn numbered_listings(n: usize) -> Vec<Listing> {
    (1..=n)
        .map(|i| {
            listing(
                &format!("key{i:03}"),
                "Data Engineer",
                "Acme",
                "Build pipelines and dashboards",
            )
        })
        .collect()
}

/// One page of the search API response for `listings`.
pub fn search_page(listings: &[Listing], end: usize, total: usize) -> serde_json::Value {
    let results: Vec<_> = listings
        .iter()
        .map(|l| {
            serde_json::json!({
                "jobkey": l.id,
                "jobtitle": l.title,
                "company": l.company,
                "date": l.date_created,
                "formattedLocation": l.location,
                "url": format!("{}&qd=tracking&indpubnum=123", l.url),
                "latitude": l.latitude,
                "longitude": l.longitude,
                "snippet": l.description,
            })
        })
        .collect();
    serde_json::json!({
        "results": results,
        "end": end,
        "totalResults": total,
    })
}

pub fn email_config() -> EmailConfig {
    EmailConfig {
        email_from: "test.sender@gmail.com".into(),
        email_to: "test.recipient@gmail.com".into(),
        password: "test1234".into(),
        name: Some("Matthew".into()),
        sender_name: Some("Job-Notify".into()),
        signature: Some("- T".into()),
        smtp_host: DEFAULT_SMTP_HOST.into(),
        smtp_port: DEFAULT_SMTP_PORT,
    }
}

pub fn app_config(source_url: &str, slack_url: &str) -> AppConfig {
    AppConfig {
        indeed: IndeedConfig {
            publisher_key: "4815162342".into(),
            query: "scientist".into(),
            location: "dublin".into(),
            country: "ie".into(),
            radius: 10,
            api_url: source_url.to_string(),
        },
        email: email_config(),
        slack: SlackConfig {
            token: "xoxb-test".into(),
            channel: "#jobs".into(),
            api_url: slack_url.to_string(),
        },
        notify_via: NotifyVia {
            slack: true,
            email: true,
        },
    }
}

/// Records every batch size it is asked to send; optionally fails.
#[derive(Clone)]
pub struct RecordingNotifier {
    channel: Channel,
    fail_with: Option<String>,
    pub calls: Arc<Mutex<Vec<usize>>>,
}

impl RecordingNotifier {
    pub fn ok(channel: Channel) -> Self {
        Self {
            channel,
            fail_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(channel: Channel, reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::ok(channel)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, batch: &NotificationBatch<'_>) -> Result<(), DispatchError> {
        self.calls.lock().push(batch.listings.len());
        match (&self.fail_with, self.channel) {
            (None, _) => Ok(()),
            (Some(r), Channel::Chat) => Err(DispatchError::ChatConfigError(r.clone())),
            (Some(r), Channel::Email) => Err(DispatchError::EmailAuthError(r.clone())),
        }
    }
}
