//! Application configuration.
//!
//! Configuration is stored in `.ticketdesk/config.yaml` and includes:
//! - The ticket service base URL and request timeout
//! - Search debounce and classification thresholds
//! - Ticket creation policy
//!
//! A project-local file wins over the per-user file; environment variables
//! win over both.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{TicketDeskError, Result};
use crate::types::TICKETDESK_DIR;

pub const ENV_API_URL: &str = "TICKETDESK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TICKETDESK_TIMEOUT_SECS";

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_url",
    "request_timeout_secs",
    "search_debounce_ms",
    "classify_min_chars",
    "require_category_priority",
    "success_message_ms",
    "close_on_success",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the ticket service API (default: http://localhost:8000/api)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bound on every network request in seconds (default: 10)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Quiet period before search text propagates into the filter (default: 300)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Minimum trimmed description length that triggers classification (default: 10)
    #[serde(default = "default_classify_min_chars")]
    pub classify_min_chars: usize,

    /// Whether category and priority are required to submit (default: true)
    #[serde(default = "default_require_category_priority")]
    pub require_category_priority: bool,

    /// How long the creation success message stays visible (default: 3000)
    #[serde(default = "default_success_message_ms")]
    pub success_message_ms: u64,

    /// Close the creation form once the success message expires (default: false)
    #[serde(default)]
    pub close_on_success: bool,
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_classify_min_chars() -> usize {
    10
}

fn default_require_category_priority() -> bool {
    true
}

fn default_success_message_ms() -> u64 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            search_debounce_ms: default_search_debounce_ms(),
            classify_min_chars: default_classify_min_chars(),
            require_category_priority: default_require_category_priority(),
            success_message_ms: default_success_message_ms(),
            close_on_success: false,
        }
    }
}

impl Config {
    /// Path of the project-local config file
    pub fn local_path() -> PathBuf {
        PathBuf::from(TICKETDESK_DIR).join("config.yaml")
    }

    /// Path of the per-user config file, if a home directory is known
    pub fn user_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "ticketdesk", "ticketdesk")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Load configuration with environment overrides applied
    pub fn load() -> Result<Self> {
        let mut config = Self::load_stored()?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file that `load` would use, without environment overrides
    pub fn load_stored() -> Result<Self> {
        let local = Self::local_path();
        if local.exists() {
            return Self::load_from(&local);
        }
        if let Some(user) = Self::user_path()
            && user.exists()
        {
            return Self::load_from(&user);
        }
        Ok(Config::default())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the project-local file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::local_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var(ENV_API_URL)
            && !url.is_empty()
        {
            self.api_url = url;
        }

        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS)
            && !secs.is_empty()
        {
            self.request_timeout_secs = secs.parse().map_err(|_| {
                TicketDeskError::Config(format!("{ENV_TIMEOUT_SECS} must be a number, got '{secs}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.api_base()?;
        if self.request_timeout_secs == 0 {
            return Err(TicketDeskError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed API base URL with a trailing slash, ready for `Url::join`
    pub fn api_base(&self) -> Result<Url> {
        let mut raw = self.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| TicketDeskError::Config(format!("invalid api_url '{}': {e}", self.api_url)))?;
        if url.cannot_be_a_base() {
            return Err(TicketDeskError::Config(format!(
                "api_url '{}' cannot be used as a base URL",
                self.api_url
            )));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn success_message_duration(&self) -> Duration {
        Duration::from_millis(self.success_message_ms)
    }

    /// Read a single key as a display string
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "api_url" => self.api_url.clone(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            "search_debounce_ms" => self.search_debounce_ms.to_string(),
            "classify_min_chars" => self.classify_min_chars.to_string(),
            "require_category_priority" => self.require_category_priority.to_string(),
            "success_message_ms" => self.success_message_ms.to_string(),
            "close_on_success" => self.close_on_success.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a single key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => self.api_url = value.to_string(),
            "request_timeout_secs" => self.request_timeout_secs = parse_value(key, value)?,
            "search_debounce_ms" => self.search_debounce_ms = parse_value(key, value)?,
            "classify_min_chars" => self.classify_min_chars = parse_value(key, value)?,
            "require_category_priority" => {
                self.require_category_priority = parse_value(key, value)?
            }
            "success_message_ms" => self.success_message_ms = parse_value(key, value)?,
            "close_on_success" => self.close_on_success = parse_value(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        self.validate()
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TicketDeskError::Config(format!("invalid value '{value}' for {key}")))
}

fn unknown_key(key: &str) -> TicketDeskError {
    TicketDeskError::Config(format!(
        "unknown config key '{}', expected one of: {}",
        key,
        VALID_CONFIG_KEYS.join(", ")
    ))
}
