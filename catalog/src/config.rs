use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Upper bound accepted by the provider for the `per_page` parameter.
pub const MAX_PER_PAGE: u32 = 200;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("API token not configured: {0} is missing or empty")]
    MissingCredential(&'static str),

    #[error("invalid port {0:?}")]
    InvalidPortValue(String),

    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("per_page must be between 1 and {MAX_PER_PAGE}, got {0}")]
    InvalidPerPage(u32),

    #[error("max_pages cannot be 0")]
    InvalidMaxPages,

    #[error("request_timeout_secs cannot be 0")]
    InvalidTimeout,
}

/// Bearer token used for every provider call.
///
/// Read once at startup and never reloaded.
#[derive(Clone, PartialEq)]
pub struct Credential(String);

impl Credential {
    pub const ENV_VAR: &'static str = "DO_TOKEN";

    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::MissingCredential(Self::ENV_VAR));
        }
        Ok(Credential(token))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_value(std::env::var(Self::ENV_VAR).ok())
    }

    /// Builds the credential from the raw `DO_TOKEN` value; unset counts as missing.
    pub fn from_env_value(value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(token) => Self::new(token),
            None => Err(ConfigError::MissingCredential(Self::ENV_VAR)),
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}

/// Settings for the upstream metadata API.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: Url,
    /// Page size hint sent with every list call of a fetch.
    pub per_page: u32,
    /// Number of pages after which a fetch is abandoned as runaway.
    pub max_pages: usize,
    /// Deadline for one complete fetch, all pages included.
    pub request_timeout_secs: u64,
    /// Extra attempts for a page that failed with a retriable status.
    pub retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: Url::parse("https://api.digitalocean.com").expect("static URL is valid"),
            per_page: MAX_PER_PAGE,
            max_pages: 10_000,
            request_timeout_secs: 30,
            retries: 0,
            retry_base_delay_ms: 500,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ConfigError::InvalidPerPage(self.per_page));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::InvalidMaxPages);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    /// Health and readiness probes. Disabled when absent.
    pub admin_listener: Option<Listener>,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listener.validate()?;
        if let Some(admin) = &self.admin_listener {
            admin.validate()?;
        }
        self.provider.validate()
    }

    /// Applies the `PORT` environment value, which takes precedence over the file.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
        let Some(port) = port else {
            return Ok(());
        };
        if port.is_empty() {
            return Ok(());
        }
        self.listener.port = port
            .parse()
            .map_err(|_| ConfigError::InvalidPortValue(port.to_string()))?;
        Ok(())
    }
}
