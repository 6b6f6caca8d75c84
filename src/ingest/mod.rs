// src/ingest/mod.rs
//! Paginated consumption of the job search API.
//!
//! [`ListingPager`] is a pull-based, non-restartable sequence: nothing is
//! requested until the first [`ListingPager::next`], and a malformed page
//! only surfaces when the caller advances onto it.

pub mod indeed;
pub mod types;

use std::collections::VecDeque;

use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::config::IndeedConfig;
use crate::error::IngestionError;
use crate::ingest::indeed::SearchResponse;
use crate::ingest::types::Listing;

/// Results per page; the API caps this at 25.
pub const PAGE_LIMIT: u32 = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub publisher: String,
    pub query: String,
    pub location: String,
    pub radius: u32,
    pub job_type: String,
    pub limit: u32,
    pub max_age_days: u32,
    pub start: u32,
    pub highlight: u8,
    pub latlong: u8,
    pub country: String,
    pub version: u8,
    pub format: String,
}

impl SearchParams {
    pub fn from_config(cfg: &IndeedConfig) -> Self {
        Self {
            publisher: cfg.publisher_key.clone(),
            query: cfg.query.clone(),
            location: cfg.location.clone(),
            radius: cfg.radius,
            job_type: "fulltime".to_string(),
            limit: PAGE_LIMIT,
            max_age_days: 10,
            start: 0,
            highlight: 0,
            latlong: 1,
            country: cfg.country.clone(),
            version: 2,
            format: "json".to_string(),
        }
    }

    fn pairs(&self, start: u32) -> Vec<(&'static str, String)> {
        vec![
            ("publisher", self.publisher.clone()),
            ("q", self.query.clone()),
            ("l", self.location.clone()),
            ("radius", self.radius.to_string()),
            ("jt", self.job_type.clone()),
            ("limit", self.limit.to_string()),
            ("fromage", self.max_age_days.to_string()),
            ("start", start.to_string()),
            ("highlight", self.highlight.to_string()),
            ("latlong", self.latlong.to_string()),
            ("co", self.country.clone()),
            ("v", self.version.to_string()),
            ("format", self.format.clone()),
        ]
    }
}

/// Request URL for the page beginning at `start`.
pub fn build_url(base: &str, params: &SearchParams, start: u32) -> Result<Url, IngestionError> {
    Url::parse_with_params(base, params.pairs(start)).map_err(|e| {
        IngestionError::InvalidSourceUrl {
            url: base.to_string(),
            reason: e.to_string(),
        }
    })
}

/// One page of results plus the cursor for the following page, if any.
#[derive(Debug)]
pub struct Page {
    pub listings: Vec<Listing>,
    pub next_start: Option<u32>,
}

/// Fetch and decode a single page. No retry, no caching.
pub async fn fetch_page(
    client: &Client,
    base: &str,
    params: &SearchParams,
    start: u32,
) -> Result<Page, IngestionError> {
    let url = build_url(base, params, start)?;
    debug!(start, "fetching listings page");

    let body = client.get(url).send().await?.text().await?;
    let resp = SearchResponse::parse(&body, start)?;

    let last = resp.is_last_page();
    let listings: Vec<Listing> = resp.results.into_iter().map(Listing::from).collect();

    let next_start = if last {
        None
    } else if listings.is_empty() {
        warn!(start, "source reported more results but returned an empty page; stopping");
        None
    } else {
        Some(start + params.limit)
    };

    Ok(Page {
        listings,
        next_start,
    })
}

pub struct ListingPager {
    client: Client,
    base_url: String,
    params: SearchParams,
    next_start: Option<u32>,
    buffered: VecDeque<Listing>,
    pages_fetched: usize,
}

impl ListingPager {
    pub fn new(client: Client, base_url: impl Into<String>, params: SearchParams) -> Self {
        let next_start = Some(params.start);
        Self {
            client,
            base_url: base_url.into(),
            params,
            next_start,
            buffered: VecDeque::new(),
            pages_fetched: 0,
        }
    }

    /// Next listing, fetching the following page when the current one is
    /// drained. After an error or the last page, returns `None`.
    pub async fn next(&mut self) -> Option<Result<Listing, IngestionError>> {
        loop {
            if let Some(listing) = self.buffered.pop_front() {
                return Some(Ok(listing));
            }

            let start = self.next_start.take()?;
            match fetch_page(&self.client, &self.base_url, &self.params, start).await {
                Ok(page) => {
                    self.pages_fetched += 1;
                    self.buffered.extend(page.listings);
                    self.next_start = page.next_start;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams {
            publisher: "4815162342".into(),
            query: "data scientist".into(),
            location: "dublin".into(),
            radius: 10,
            job_type: "fulltime".into(),
            limit: 25,
            max_age_days: 10,
            start: 0,
            highlight: 0,
            latlong: 1,
            country: "ie".into(),
            version: 2,
            format: "json".into(),
        }
    }

    #[test]
    fn url_encodes_params_in_order() {
        let url = build_url("http://api.indeed.com/ads/apisearch", &params(), 0).unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.indeed.com/ads/apisearch?publisher=4815162342&q=data+scientist&l=dublin\
             &radius=10&jt=fulltime&limit=25&fromage=10&start=0&highlight=0&latlong=1&co=ie&v=2&format=json"
        );
    }

    #[test]
    fn cursor_is_an_argument_not_state() {
        let p = params();
        let url = build_url("http://x/search", &p, 50).unwrap();
        assert!(url.as_str().contains("&start=50&"));
        assert_eq!(p.start, 0);
    }

    #[test]
    fn bad_base_url_is_reported() {
        assert!(matches!(
            build_url("not a url", &params(), 0),
            Err(IngestionError::InvalidSourceUrl { .. })
        ));
    }
}
