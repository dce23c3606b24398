use std::time::Duration;

use crate::errors::CoreError;

/// Default API root when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Storage key under which the bearer token is persisted.
pub const DEFAULT_TOKEN_KEY: &str = "token";

pub const ENV_BASE_URL: &str = "TRADE_JOURNAL_API_URL";
pub const ENV_TOKEN_KEY: &str = "TRADE_JOURNAL_TOKEN_KEY";
pub const ENV_TIMEOUT_SECS: &str = "TRADE_JOURNAL_TIMEOUT_SECS";

/// Client configuration: where the API lives and where the token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root; every request path is appended to it (e.g. `https://host/api`).
    pub base_url: String,

    /// Key of the persisted token in the token store.
    pub token_key: String,

    /// Per-request timeout. `None` leaves requests unbounded.
    /// Ignored on wasm, where the browser owns timeouts.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Defaults overridden by `TRADE_JOURNAL_*` environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(key) = lookup(ENV_TOKEN_KEY) {
            config.token_key = key;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CoreError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {secs:?}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no request could be built from.
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| CoreError::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "base URL must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.token_key.trim().is_empty() {
            return Err(CoreError::Config("token key must not be empty".into()));
        }
        Ok(())
    }
}
