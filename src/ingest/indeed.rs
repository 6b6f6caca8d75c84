// src/ingest/indeed.rs
//! Wire format of the job search API (JSON, `v=2`).

use serde::Deserialize;

use crate::error::IngestionError;
use crate::ingest::types::{canonical_url, Listing};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub end: u32,
    #[serde(default, rename = "totalResults")]
    pub total_results: u32,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub jobkey: String,
    #[serde(default)]
    pub jobtitle: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "formattedLocation")]
    pub formatted_location: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub snippet: String,
}

impl From<SearchResult> for Listing {
    fn from(r: SearchResult) -> Self {
        let url = canonical_url(&r.url).to_string();
        Listing {
            id: r.jobkey,
            company: r.company,
            date_created: r.date,
            description: r.snippet,
            title: r.jobtitle,
            latitude: r.latitude,
            location: r.formatted_location,
            longitude: r.longitude,
            url,
        }
    }
}

impl SearchResponse {
    pub fn parse(body: &str, start: u32) -> Result<Self, IngestionError> {
        let resp: SearchResponse = serde_json::from_str(body)
            .map_err(|source| IngestionError::MalformedResponse { start, source })?;

        if let Some(err) = &resp.error {
            let reason = match err {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(IngestionError::SourceAuthError(reason));
        }
        Ok(resp)
    }

    pub fn is_last_page(&self) -> bool {
        self.end >= self.total_results
    }
}
