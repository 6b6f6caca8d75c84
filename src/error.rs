// src/error.rs
//! Error taxonomy for one notification run.
//!
//! Every boundary returns its own enum; nothing is recovered internally and
//! any of these aborts the run before the store is persisted.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ini::IniError;

/// Problems with the configuration document's content (not its syntax).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("section '{0}' not found in configuration file")]
    SectionNotFound(String),

    #[error("key(s) {} missing from '{section}' section", join_keys(.keys))]
    RequiredKeyMissing { section: String, keys: Vec<String> },

    #[error("key(s) {} in '{section}' section are blank", join_keys(.keys))]
    BlankKey { section: String, keys: Vec<String> },

    #[error("'{value}' is not a boolean (key '{key}' in '{section}' section)")]
    InvalidBoolean {
        section: String,
        key: String,
        value: String,
    },

    #[error("notifications must be enabled for at least one option")]
    NoChannelEnabled,
}

fn join_keys(keys: &[String]) -> String {
    keys.iter()
        .map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("source rejected the request: {0}")]
    SourceAuthError(String),

    #[error("malformed response from source (start={start}): {source}")]
    MalformedResponse {
        start: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid source url '{url}': {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    #[error("source request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("slack configuration error: {0}")]
    ChatConfigError(String),

    #[error("slack request failed: {0}")]
    ChatTransport(#[from] reqwest::Error),

    #[error(
        "email authentication error, check `email_from` and `password` in the configuration file: {0}"
    )]
    EmailAuthError(String),

    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("email delivery failed: {0}")]
    EmailTransport(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store {} is corrupt: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store i/o on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a run can surface to its caller.
#[derive(Debug, Error)]
pub enum JobNotifyError {
    #[error("configuration file '{}' does not exist", .0.display())]
    ConfigFileNotFound(PathBuf),

    #[error(transparent)]
    Syntax(#[from] IniError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
