// src/ingest/types.rs
use serde::{Deserialize, Serialize};

/// One job posting. The id is the store key, so it is not part of the
/// persisted record; field order matches the sorted keys on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    #[serde(skip)]
    pub id: String,
    pub company: String,
    pub date_created: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "jobtitle")]
    pub title: String,
    #[serde(rename = "lat")]
    pub latitude: Option<f64>,
    pub location: String,
    #[serde(rename = "lon")]
    pub longitude: Option<f64>,
    pub url: String,
}

/// Drop tracking parameters: everything from the first `&` on.
pub fn canonical_url(raw: &str) -> &str {
    raw.split('&').next().unwrap_or(raw)
}
