// src/store.rs
//! De-duplication store: listing id -> listing, one JSON file per
//! (query, location) pair.
//!
//! Single writer, no locking. Two runs against the same file at the same
//! time are not supported.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;
use crate::ingest::types::Listing;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupStore {
    entries: BTreeMap<String, Listing>,
}

/// `"Data Scientist", "New-York"` -> `data_scientist_new_york.json`
pub fn store_file_name(query: &str, location: &str) -> String {
    format!("{}_{}.json", sanitise(query), sanitise(location))
}

fn sanitise(s: &str) -> String {
    s.to_lowercase().replace([' ', '-'], "_")
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Missing file means an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no store yet, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut entries: BTreeMap<String, Listing> =
            serde_json::from_str(&text).map_err(|source| StoreError::CorruptStore {
                path: path.to_path_buf(),
                source,
            })?;
        for (id, listing) in entries.iter_mut() {
            listing.id = id.clone();
        }

        debug!(path = %path.display(), entries = entries.len(), "store loaded");
        Ok(Self { entries })
    }

    /// Listings whose id is not in the store, in fetch order. Repeated ids
    /// within `fetched` keep their first occurrence.
    pub fn diff<I>(&self, fetched: I) -> Vec<Listing>
    where
        I: IntoIterator<Item = Listing>,
    {
        let mut seen = HashSet::new();
        fetched
            .into_iter()
            .filter(|l| !self.contains(&l.id) && seen.insert(l.id.clone()))
            .collect()
    }

    /// A new store holding `self` plus `new`; `self` is untouched.
    pub fn merge(&self, new: &[Listing]) -> Self {
        let mut entries = self.entries.clone();
        for listing in new {
            entries
                .entry(listing.id.clone())
                .or_insert_with(|| listing.clone());
        }
        Self { entries }
    }

    /// Write the whole mapping with sorted keys and two-space indentation.
    /// Goes through a temp file in the same directory and a rename, so a
    /// crash never leaves a half-written store.
    pub fn persist(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| io_err(std::io::Error::other(e)))?;

        let dir = parent_dir(path);
        fs::create_dir_all(&dir).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        debug!(path = %path.display(), entries = self.entries.len(), "store written");
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
