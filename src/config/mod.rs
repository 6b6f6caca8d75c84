// src/config/mod.rs
//! Configuration gate: validates the INI document section by section and
//! hands out typed structs, so nothing downstream looks keys up by string.

pub mod ini;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConfigurationError, JobNotifyError};
use self::ini::{IniDocument, IniSection};

pub const ENV_CONFIG_PATH: &str = "JOBNOTIFY_CONFIG";
pub const CONFIG_FILE_NAME: &str = "jobnotify.config";

pub const DEFAULT_RADIUS: u32 = 25;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
pub const DEFAULT_SOURCE_URL: &str = "http://api.indeed.com/ads/apisearch";

pub const SECTION_INDEED: &str = "indeed";
pub const SECTION_EMAIL: &str = "email";
pub const SECTION_SLACK: &str = "slack";
pub const SECTION_NOTIFY_VIA: &str = "notify_via";

/// Required sections and their required keys, in validation order.
/// `notify_via` stays last: the channel check runs after it validates.
pub const REQUIRED_SECTIONS: &[(&str, &[&str])] = &[
    (SECTION_INDEED, &["key", "query", "location", "country"]),
    (SECTION_EMAIL, &["email_from", "email_to", "password"]),
    (SECTION_SLACK, &["token", "channel"]),
    (SECTION_NOTIFY_VIA, &["email", "slack"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndeedConfig {
    pub publisher_key: String,
    pub query: String,
    pub location: String,
    pub country: String,
    pub radius: u32,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub email_from: String,
    pub email_to: String,
    pub password: String,
    pub name: Option<String>,
    pub sender_name: Option<String>,
    pub signature: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackConfig {
    pub token: String,
    pub channel: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyVia {
    pub slack: bool,
    pub email: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub indeed: IndeedConfig,
    pub email: EmailConfig,
    pub slack: SlackConfig,
    pub notify_via: NotifyVia,
}

impl AppConfig {
    /// Read and validate a configuration file.
    pub fn load_from(path: &Path) -> Result<Self, JobNotifyError> {
        let text = fs::read_to_string(path)?;
        let doc = IniDocument::parse(&text)?;
        let cfg = Self::from_document(&doc)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(cfg)
    }

    pub fn from_document(doc: &IniDocument) -> Result<Self, ConfigurationError> {
        let sections = validate_sections(doc, REQUIRED_SECTIONS)?;
        let [indeed, email, slack, notify_via] = sections.as_slice() else {
            unreachable!("one validated section per required entry");
        };

        let notify_via = notify_via_from(notify_via)?;

        Ok(Self {
            indeed: indeed_from(indeed),
            email: email_from(email),
            slack: slack_from(slack),
            notify_via,
        })
    }
}

/// Config file location: explicit path, then `$JOBNOTIFY_CONFIG`, then the
/// default under the application directory.
pub fn resolve_config_path(explicit: Option<PathBuf>, app_dir: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p;
    }
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }
    app_dir.join(CONFIG_FILE_NAME)
}

/// Checks each `(section, required keys)` pair in order: presence, then
/// missing keys (all reported at once), then blank values (all at once).
pub fn validate_sections<'a>(
    doc: &'a IniDocument,
    required: &[(&str, &[&str])],
) -> Result<Vec<&'a IniSection>, ConfigurationError> {
    let mut out = Vec::with_capacity(required.len());

    for (name, keys) in required {
        let section = doc
            .section(name)
            .ok_or_else(|| ConfigurationError::SectionNotFound(name.to_string()))?;

        let missing: Vec<String> = keys
            .iter()
            .filter(|k| !section.contains_key(k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigurationError::RequiredKeyMissing {
                section: name.to_string(),
                keys: missing,
            });
        }

        let blank: Vec<String> = section
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(k, _)| k.to_string())
            .collect();
        if !blank.is_empty() {
            return Err(ConfigurationError::BlankKey {
                section: name.to_string(),
                keys: blank,
            });
        }

        out.push(section);
    }

    Ok(out)
}

fn notify_via_from(section: &IniSection) -> Result<NotifyVia, ConfigurationError> {
    let flag = |key: &str| -> Result<bool, ConfigurationError> {
        match section.get_bool(key) {
            Some(Ok(b)) => Ok(b),
            Some(Err(value)) => Err(ConfigurationError::InvalidBoolean {
                section: section.name().to_string(),
                key: key.to_string(),
                value,
            }),
            None => Ok(false),
        }
    };

    let nv = NotifyVia {
        slack: flag("slack")?,
        email: flag("email")?,
    };

    // Any extra toggle in the section counts too.
    let mut any_enabled = nv.slack || nv.email;
    for (key, _) in section.iter() {
        if key != "slack" && key != "email" {
            any_enabled |= flag(key)?;
        }
    }

    if !any_enabled {
        return Err(ConfigurationError::NoChannelEnabled);
    }
    Ok(nv)
}

fn optional(section: &IniSection, key: &str) -> Option<String> {
    section.get(key).map(str::to_string)
}

fn required(section: &IniSection, key: &str) -> String {
    // presence already checked by validate_sections
    section.get(key).unwrap_or_default().to_string()
}

/// Advisory parse: a bad value falls back to `default` with a warning.
fn lenient_number<T>(section: &IniSection, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match section.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(
                section = section.name(),
                key,
                value = raw,
                default = %default,
                "invalid number in configuration, using default"
            );
            default
        }),
    }
}

fn indeed_from(section: &IniSection) -> IndeedConfig {
    IndeedConfig {
        publisher_key: required(section, "key"),
        query: required(section, "query"),
        location: required(section, "location"),
        country: required(section, "country"),
        radius: lenient_number(section, "radius", DEFAULT_RADIUS),
        api_url: optional(section, "api_url").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
    }
}

fn email_from(section: &IniSection) -> EmailConfig {
    EmailConfig {
        email_from: required(section, "email_from"),
        email_to: required(section, "email_to"),
        password: required(section, "password"),
        name: optional(section, "name"),
        sender_name: optional(section, "sender_name"),
        signature: optional(section, "signature"),
        smtp_host: optional(section, "smtp_host").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
        smtp_port: lenient_number(section, "smtp_port", DEFAULT_SMTP_PORT),
    }
}

fn slack_from(section: &IniSection) -> SlackConfig {
    SlackConfig {
        token: required(section, "token"),
        channel: required(section, "channel"),
        api_url: optional(section, "api_url").unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
    }
}
