// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod setup;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::error::{
    ConfigurationError, DispatchError, IngestionError, JobNotifyError, StoreError,
};
pub use crate::ingest::types::Listing;
pub use crate::notify::{Channel, NotificationBatch, NotificationDispatcher, Notifier};
pub use crate::pipeline::{jobnotify, Pipeline, RunOutcome};
pub use crate::store::DedupStore;
