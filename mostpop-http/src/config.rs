//! Transport configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mostpop_core::constants::{DEFAULT_API_HOST, DEFAULT_API_SCHEME, DEFAULT_HTTP_TIMEOUT_SECONDS};
use mostpop_core::error::{FeedError, Result};

/// Scheme and host the API is served from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvironment {
    /// URL scheme, normally "https"
    pub scheme: String,
    /// Host, optionally with a port
    pub host: String,
}

impl ApiEnvironment {
    /// Creates an environment for an arbitrary host.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Environment used by debug builds.
    pub fn development() -> Self {
        Self::new(DEFAULT_API_SCHEME, DEFAULT_API_HOST)
    }

    /// Environment used by release builds.
    pub fn production() -> Self {
        Self::new(DEFAULT_API_SCHEME, DEFAULT_API_HOST)
    }

    /// Picks development or production based on the build profile.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }
}

impl Default for ApiEnvironment {
    fn default() -> Self {
        Self::for_build()
    }
}

/// HTTP transport configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Where requests are sent
    pub environment: ApiEnvironment,
    /// NYT API key, appended to every request as `api-key`
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            environment: ApiEnvironment::default(),
            api_key: None,
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
        }
    }
}

impl fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfig")
            .field("environment", &self.environment)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl HttpConfig {
    /// Creates a config for `environment` without credentials.
    pub fn new(environment: ApiEnvironment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Returns the API key if it is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Loads configuration from the process environment (and `.env`).
    ///
    /// Reads `NYT_API_KEY`, `NYT_API_HOST`, `NYT_API_SCHEME` and
    /// `NYT_HTTP_TIMEOUT_SECS`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(scheme) = lookup("NYT_API_SCHEME") {
            config.environment.scheme = scheme;
        }
        if let Some(host) = lookup("NYT_API_HOST") {
            config.environment.host = host;
        }
        config.api_key = lookup("NYT_API_KEY");

        if let Some(raw) = lookup("NYT_HTTP_TIMEOUT_SECS") {
            config.timeout_seconds = raw.trim().parse().map_err(|_| {
                FeedError::Config(format!("NYT_HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?;
        }

        Ok(config)
    }
}
