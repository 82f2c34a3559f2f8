//! # Client Configuration
//!
//! Configuration for the Lumino client: the API key used as a bearer
//! credential, the base URL of the service, and optional transport settings.
//!
//! Configuration can be assembled three ways:
//!
//! - `ClientConfig::new(api_key)` with defaults for everything else
//! - `ClientConfig::builder()` for a fluent, field-by-field setup
//! - `ClientConfig::from_env()` reading `LUMINO_API_KEY` and `LUMINO_BASE_URL`

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Default base URL of the Lumino API
pub const DEFAULT_BASE_URL: &str = "https://api.luminolabs.ai/v1";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "LUMINO_API_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "LUMINO_BASE_URL";

/// Configuration for a Lumino client
#[derive(Clone)]
pub struct ClientConfig {
    /// API key sent as a bearer token on every request
    pub api_key: String,

    /// Base URL that endpoint paths are appended to
    pub base_url: String,

    /// Total request timeout; `None` leaves the transport default in place
    pub timeout: Option<Duration>,

    /// User-Agent header value
    pub user_agent: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: format!("lumino-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create a new builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from `LUMINO_API_KEY` and `LUMINO_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{} environment variable must be set", API_KEY_ENV)))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used to build a client
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Base URL '{}' cannot have paths appended",
                self.base_url
            )));
        }

        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Override the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set a total request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
