// src/notify/format.rs
//! Message bodies for each channel.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EmailConfig;
use crate::ingest::types::Listing;

/// Listings per chat message.
pub const CHAT_CHUNK_LISTINGS: usize = 10;

/// Entry markers that open a new chunk: `11.`, `21.`, `31.`, ...
static CHUNK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d?\d1\.").expect("static chunk marker regex"));

/// Chat message, split into chunks of at most ten listings.
///
/// The split is textual: it cuts right before every `\d?\d1.` in the
/// assembled text. A snippet containing such a pattern, or more than 99
/// listings, will misplace a cut.
pub fn chat_chunks(listings: &[Listing]) -> Vec<String> {
    let msg = listings
        .iter()
        .enumerate()
        .map(|(i, l)| {
            format!(
                "{}. <{}|{} @ {}>\nSnippet: {}\n",
                i + 1,
                l.url,
                l.title,
                l.company,
                l.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    if listings.len() <= CHAT_CHUNK_LISTINGS {
        return vec![msg];
    }

    tracing::debug!(
        chunks = listings.len().div_ceil(CHAT_CHUNK_LISTINGS),
        "splitting chat message"
    );

    let mut chunks = Vec::new();
    let mut from = 0;
    for m in CHUNK_MARKER.find_iter(&msg) {
        chunks.push(msg[from..m.start()].to_string());
        from = m.start();
    }
    chunks.push(msg[from..].to_string());
    chunks
}

/// A composed email before it is handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub sender_name: String,
    pub sender_address: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl EmailDraft {
    /// Headers plus body as plain text, for previews and logs.
    pub fn render(&self) -> String {
        format!(
            "From: {} <{}>\nTo: {}\nSubject: {}\n{}",
            self.sender_name, self.sender_address, self.recipient, self.subject, self.body
        )
    }
}

pub fn email_subject(count: usize) -> String {
    let job_s = if count == 1 { "job" } else { "jobs" };
    format!("Job opportunities: {count} new {job_s} posted")
}

pub fn compose_email(
    cfg: &EmailConfig,
    query: &str,
    location: &str,
    listings: &[Listing],
) -> EmailDraft {
    let n = listings.len();

    // greeting falls back to the local part of the recipient address
    let name = cfg.name.clone().unwrap_or_else(|| {
        cfg.email_to
            .split('@')
            .next()
            .unwrap_or(&cfg.email_to)
            .to_string()
    });
    let sender_name = cfg
        .sender_name
        .clone()
        .unwrap_or_else(|| cfg.email_from.clone());
    let signature = cfg.signature.as_deref().unwrap_or("");

    let (is_are, was_were, listing_s) = if n == 1 {
        ("is", "was", "listing")
    } else {
        ("are", "were", "listings")
    };

    let entries = listings
        .iter()
        .enumerate()
        .map(|(i, l)| {
            format!(
                "{}. {} @ {}\nLink: {}\nLocation: {}\nSnippet: {}\n",
                i + 1,
                l.title,
                l.company,
                l.url,
                l.location,
                l.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "Hello {name},\n\n\
         There {is_are} {n} new job {listing_s} to review.\n\
         The following job {listing_s} {was_were} found for '{query}' in '{location}':\n\n\
         {entries}\n\
         {signature}"
    );

    EmailDraft {
        sender_name,
        sender_address: cfg.email_from.clone(),
        recipient: cfg.email_to.clone(),
        subject: email_subject(n),
        body,
    }
}
