//! Configuration for the search client and the field session.
//!
//! The search credentials arrive either as the app's installation
//! parameters (stored by the host platform) or, for command-line
//! tooling, from environment variables.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reload::DEFAULT_RELOAD_THRESHOLD;

/// Default number of search results per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum number of search results per page accepted by the service.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Default HTTP timeout for a single search request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of fetches while waiting for a new asset.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 10;

/// Default delay between two readiness fetches.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// InstallationParameters
// ---------------------------------------------------------------------------

/// App installation parameters as persisted by the host platform.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationParameters {
    #[serde(default)]
    pub bynder_token: String,
    #[serde(default)]
    pub bynder_domain: String,
}

impl InstallationParameters {
    /// Validate the parameters and build a [`BynderConfig`] with default
    /// paging and timeout.
    pub fn validate(&self) -> Result<BynderConfig, CoreError> {
        BynderConfig::new(&self.bynder_token, &self.bynder_domain)
    }
}

impl fmt::Debug for InstallationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationParameters")
            .field("bynder_token", &redact(&self.bynder_token))
            .field("bynder_domain", &self.bynder_domain)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BynderConfig
// ---------------------------------------------------------------------------

/// Validated settings for the external asset search client.
#[derive(Clone, PartialEq, Eq)]
pub struct BynderConfig {
    /// Permanent API token sent as a bearer token.
    pub token: String,
    /// Base URL of the portal, without a trailing slash.
    pub domain: String,
    pub page_size: u32,
    pub request_timeout: Duration,
}

impl BynderConfig {
    pub fn new(token: &str, domain: &str) -> Result<Self, CoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CoreError::Config("API token is required".to_string()));
        }

        let domain = domain.trim().trim_end_matches('/');
        if domain.is_empty() {
            return Err(CoreError::Config("API domain is required".to_string()));
        }
        let has_host = domain
            .strip_prefix("https://")
            .or_else(|| domain.strip_prefix("http://"))
            .is_some_and(|rest| !rest.is_empty());
        if !has_host {
            return Err(CoreError::Config(format!(
                "API domain must be an http(s) URL, got '{domain}'"
            )));
        }

        Ok(Self {
            token: token.to_string(),
            domain: domain.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Override the page size. Must be within `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, CoreError> {
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(CoreError::Config(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable              | Required | Default |
    /// |-----------------------|----------|---------|
    /// | `BYNDER_TOKEN`        | yes      | --      |
    /// | `BYNDER_DOMAIN`       | yes      | --      |
    /// | `BYNDER_PAGE_SIZE`    | no       | `20`    |
    /// | `BYNDER_TIMEOUT_SECS` | no       | `10`    |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let token = lookup("BYNDER_TOKEN")
            .ok_or_else(|| CoreError::Config("BYNDER_TOKEN must be set".to_string()))?;
        let domain = lookup("BYNDER_DOMAIN")
            .ok_or_else(|| CoreError::Config("BYNDER_DOMAIN must be set".to_string()))?;

        let mut config = Self::new(&token, &domain)?;

        if let Some(raw) = lookup("BYNDER_PAGE_SIZE") {
            let page_size = parse_var("BYNDER_PAGE_SIZE", &raw)?;
            config = config.with_page_size(page_size)?;
        }
        if let Some(raw) = lookup("BYNDER_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_var("BYNDER_TIMEOUT_SECS", &raw)?);
        }

        Ok(config)
    }
}

impl fmt::Debug for BynderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BynderConfig")
            .field("token", &redact(&self.token))
            .field("domain", &self.domain)
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FieldSettings
// ---------------------------------------------------------------------------

/// Tunables of the field session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSettings {
    /// Fetches made while waiting for a created asset.
    pub poll_max_attempts: u32,
    /// Delay between two fetches.
    pub poll_interval: Duration,
    /// Reloads after which "open editor" replaces "reload".
    pub reload_threshold: u32,
    /// Also wait for the created asset to be published.
    pub require_published: bool,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            reload_threshold: DEFAULT_RELOAD_THRESHOLD,
            require_published: false,
        }
    }
}

impl FieldSettings {
    /// Load settings from environment variables, falling back to defaults.
    ///
    /// | Variable                  | Default |
    /// |---------------------------|---------|
    /// | `FIELD_POLL_MAX_ATTEMPTS` | `10`    |
    /// | `FIELD_POLL_INTERVAL_MS`  | `1000`  |
    /// | `FIELD_RELOAD_THRESHOLD`  | `2`     |
    /// | `FIELD_REQUIRE_PUBLISHED` | `false` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let mut settings = Self::default();

        if let Some(raw) = lookup("FIELD_POLL_MAX_ATTEMPTS") {
            settings.poll_max_attempts = parse_var("FIELD_POLL_MAX_ATTEMPTS", &raw)?;
            if settings.poll_max_attempts == 0 {
                return Err(CoreError::Config(
                    "FIELD_POLL_MAX_ATTEMPTS must be at least 1".to_string(),
                ));
            }
        }
        if let Some(raw) = lookup("FIELD_POLL_INTERVAL_MS") {
            settings.poll_interval =
                Duration::from_millis(parse_var("FIELD_POLL_INTERVAL_MS", &raw)?);
        }
        if let Some(raw) = lookup("FIELD_RELOAD_THRESHOLD") {
            settings.reload_threshold = parse_var("FIELD_RELOAD_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("FIELD_REQUIRE_PUBLISHED") {
            settings.require_published = parse_var("FIELD_REQUIRE_PUBLISHED", &raw)?;
        }

        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("{name} has an invalid value '{raw}'")))
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}
