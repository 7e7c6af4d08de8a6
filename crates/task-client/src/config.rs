//! Client configuration

use reqwest::Url;
use std::fmt;

use crate::error::ConfigError;

/// Tasks endpoint used when `TASKAPP_API_URL` is unset
pub const DEFAULT_API_URL: &str = "http://localhost:3000/tasks";

pub const API_URL_ENV: &str = "TASKAPP_API_URL";
pub const API_KEY_ENV: &str = "TASKAPP_API_KEY";

/// Where the tasks service lives and how to authenticate against it
#[derive(Clone)]
pub struct ClientConfig {
    base_url: Url,
    api_key: String,
}

impl ClientConfig {
    /// `base_url` is the tasks collection endpoint, e.g. `http://host:3000/tasks`
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot have path segments"));
        }
        if url.query().is_some() {
            return Err(invalid("URL must not carry a query string"));
        }

        Ok(Self {
            base_url: url,
            api_key: api_key.into(),
        })
    }

    /// Read `TASKAPP_API_URL` (optional) and `TASKAPP_API_KEY` (required)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingEnv(API_KEY_ENV))?;
        Self::new(&base_url, api_key)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}
