// src/pipeline.rs
//! One run: validate config, fetch, diff, dispatch, persist.
//!
//! The store is written only after every enabled channel succeeded, so any
//! failure leaves it untouched and the same listings are evaluated again on
//! the next run. A channel that sent before a later one failed will send
//! them again: delivery is at-least-once per channel.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::JobNotifyError;
use crate::ingest::{ListingPager, SearchParams};
use crate::notify::{Channel, NotificationBatch, NotificationDispatcher};
use crate::store::{store_file_name, DedupStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    ConfigValidated,
    Fetched,
    Diffed,
    Idle,
    Dispatched,
    Persisted,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Init => "init",
            RunState::ConfigValidated => "config-validated",
            RunState::Fetched => "fetched",
            RunState::Diffed => "diffed",
            RunState::Idle => "idle",
            RunState::Dispatched => "dispatched",
            RunState::Persisted => "persisted",
            RunState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing new since the last notification.
    Idle,
    Notified {
        listings: usize,
        channels: Vec<Channel>,
    },
}

pub struct Pipeline {
    config: AppConfig,
    client: Client,
    dispatcher: NotificationDispatcher,
    db_dir: PathBuf,
    state: Mutex<RunState>,
}

impl Pipeline {
    pub fn new(config: AppConfig, dispatcher: NotificationDispatcher, db_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            client: Client::new(),
            dispatcher,
            db_dir: db_dir.into(),
            state: Mutex::new(RunState::Init),
        }
    }

    /// Production wiring: real Slack/SMTP notifiers for the enabled channels.
    pub fn from_config(config: AppConfig, db_dir: impl Into<PathBuf>) -> Self {
        let dispatcher = NotificationDispatcher::from_config(&config);
        Self::new(config, dispatcher, db_dir)
    }

    pub fn store_path(&self) -> PathBuf {
        self.db_dir.join(store_file_name(
            &self.config.indeed.query,
            &self.config.indeed.location,
        ))
    }

    /// State the last run ended in.
    pub fn last_state(&self) -> RunState {
        self.state.lock().map(|s| *s).unwrap_or(RunState::Init)
    }

    fn enter(&self, to: RunState) {
        if let Ok(mut state) = self.state.lock() {
            let from = *state;
            debug!(%from, %to, "run state");
            *state = to;
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, JobNotifyError> {
        self.enter(RunState::ConfigValidated);
        let result = self.advance().await;
        if let Err(err) = &result {
            self.enter(RunState::Aborted);
            warn!(error = %err, "run aborted");
        }
        result
    }

    async fn advance(&self) -> Result<RunOutcome, JobNotifyError> {
        debug!(channels = ?self.dispatcher.channels(), "run started");

        let indeed = &self.config.indeed;
        let params = SearchParams::from_config(indeed);
        debug!(
            query = %params.query,
            location = %params.location,
            radius = params.radius,
            country = %params.country,
            key_len = params.publisher.len(),
            "search parameters"
        );

        let store_path = self.store_path();
        let store = DedupStore::load(&store_path)?;
        info!(path = %store_path.display(), known = store.len(), "store loaded");

        let mut pager = ListingPager::new(self.client.clone(), indeed.api_url.clone(), params);
        let mut fetched = Vec::new();
        while let Some(listing) = pager.next().await {
            fetched.push(listing?);
        }
        self.enter(RunState::Fetched);
        debug!(pages = pager.pages_fetched(), listings = fetched.len(), "fetch complete");

        let new = store.diff(fetched);
        self.enter(RunState::Diffed);
        info!(new = new.len(), "diff computed");

        if new.is_empty() {
            self.enter(RunState::Idle);
            info!("no new positions since last notification");
            return Ok(RunOutcome::Idle);
        }

        let batch = NotificationBatch {
            query: &indeed.query,
            location: &indeed.location,
            listings: &new,
        };
        let channels = self.dispatcher.dispatch(&batch).await?;
        self.enter(RunState::Dispatched);

        store.merge(&new).persist(&store_path)?;
        self.enter(RunState::Persisted);
        info!(path = %store_path.display(), "store written");

        Ok(RunOutcome::Notified {
            listings: new.len(),
            channels,
        })
    }
}

/// Entry point used by the binary: check the file, validate, run.
pub async fn jobnotify(config_path: &Path, db_dir: &Path) -> Result<RunOutcome, JobNotifyError> {
    if !config_path.is_file() {
        return Err(JobNotifyError::ConfigFileNotFound(config_path.to_path_buf()));
    }
    debug!(state = %RunState::Init, path = %config_path.display(), "loading configuration");

    let config = AppConfig::load_from(config_path).inspect_err(|err| {
        debug!(from = %RunState::Init, to = %RunState::Aborted, "run state");
        warn!(error = %err, "run aborted");
    })?;
    Pipeline::from_config(config, db_dir).run().await
}
