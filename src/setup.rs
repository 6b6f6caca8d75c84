// src/setup.rs
//! Application directory bootstrap (`~/.jobnotify`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE_NAME;

pub const APP_DIR_NAME: &str = ".jobnotify";
pub const DB_DIR_NAME: &str = "databases";

const SAMPLE_CONFIG: &str = include_str!("../config/jobnotify.config.sample");

/// `~/.jobnotify`, or `./.jobnotify` when no home directory is known.
pub fn default_app_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME))
}

pub fn db_dir(app_dir: &Path) -> PathBuf {
    app_dir.join(DB_DIR_NAME)
}

/// Create the app and database directories and drop in the sample config.
/// Safe to call repeatedly; an existing config file is left alone.
pub fn initial_setup(app_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(db_dir(app_dir))?;

    let cfg = app_dir.join(CONFIG_FILE_NAME);
    if !cfg.exists() {
        fs::write(&cfg, SAMPLE_CONFIG)?;
        tracing::info!(path = %cfg.display(), "sample configuration written");
    }
    Ok(())
}
