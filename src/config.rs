//! Construction-time settings: credentials, base URL and user agent.

use std::env;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://aiproxyapi-production.up.railway.app";
pub const DEFAULT_USER_AGENT: &str = concat!("BitmeshRustSdk/", env!("CARGO_PKG_VERSION"));

pub const ENV_CONSUMER_KEY: &str = "BITMESH_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "BITMESH_CONSUMER_SECRET";
pub const ENV_BASE_URL: &str = "BITMESH_API_BASE_URL";
pub const ENV_USER_AGENT: &str = "BITMESH_USER_AGENT";

/// OAuth consumer credentials. The secret only ever feeds signatures.
pub struct Credentials {
    consumer_key: String,
    consumer_secret: SecretString,
}

impl Credentials {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Credentials {
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::from(consumer_secret.into()),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub(crate) fn consumer_secret(&self) -> &str {
        self.consumer_secret.expose_secret()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Credentials::new(self.consumer_key.clone(), self.consumer_secret().to_string())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        ClientConfig {
            credentials: Credentials::new(consumer_key, consumer_secret),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Read `BITMESH_CONSUMER_KEY` and `BITMESH_CONSUMER_SECRET` (required),
    /// `BITMESH_API_BASE_URL` and `BITMESH_USER_AGENT` (optional).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Configuration(format!("{} is not set", name)))
        };
        let mut config = ClientConfig::new(
            required(ENV_CONSUMER_KEY)?,
            required(ENV_CONSUMER_SECRET)?,
        );
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            config = config.with_base_url(base_url);
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT).filter(|v| !v.is_empty()) {
            config = config.with_user_agent(user_agent);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL without trailing slashes, checked to be an absolute URL.
    pub(crate) fn normalized_base_url(&self) -> Result<String> {
        let trimmed = self.base_url.trim_end_matches('/');
        url::Url::parse(trimmed).map_err(|source| Error::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;
        Ok(trimmed.to_string())
    }
}
