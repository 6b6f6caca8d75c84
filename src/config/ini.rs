// src/config/ini.rs
//! INI reading on top of `rust-ini`, with the stricter rules configparser
//! files already follow: every key lives under a `[section]`, sections and
//! keys appear once, keys are case-insensitive, values are taken verbatim.

use std::collections::BTreeMap;

use ::ini::{Ini, ParseOption};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IniError {
    #[error(transparent)]
    Parse(#[from] ::ini::ParseError),

    #[error("key/value pair found before any [section] header")]
    MissingSectionHeader,

    #[error("section '{section}' already exists")]
    DuplicateSection { section: String },

    #[error("option '{key}' in section '{section}' already exists")]
    DuplicateOption { section: String, key: String },
}

/// One `[section]`: flat key -> string map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: BTreeMap<String, String>,
}

impl IniSection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value as a configparser-style boolean. `None` if the key is absent,
    /// `Some(Err(raw))` if present but not a boolean literal.
    pub fn get_bool(&self, key: &str) -> Option<Result<bool, String>> {
        self.get(key).map(|raw| parse_bool(raw).ok_or_else(|| raw.to_string()))
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// A parsed document; sections keep file order.
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Result<Self, IniError> {
        // passwords and signatures may carry quotes or backslashes
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, opt)?;

        let mut sections: Vec<IniSection> = Vec::new();
        for (name, props) in ini.iter() {
            let Some(name) = name else {
                if props.iter().next().is_none() {
                    continue;
                }
                return Err(IniError::MissingSectionHeader);
            };
            if sections.iter().any(|s| s.name == name) {
                return Err(IniError::DuplicateSection {
                    section: name.to_string(),
                });
            }

            let mut entries = BTreeMap::new();
            for (key, value) in props.iter() {
                let key = key.to_ascii_lowercase();
                if entries.contains_key(&key) {
                    return Err(IniError::DuplicateOption {
                        section: name.to_string(),
                        key,
                    });
                }
                entries.insert(key, value.trim().to_string());
            }
            sections.push(IniSection {
                name: name.to_string(),
                entries,
            });
        }

        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}
