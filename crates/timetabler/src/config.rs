/// Client configuration: service location, identity and timeouts
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Service the frontend talks to when nothing else is configured.
const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Identity used while authentication is disabled.
const ANONYMOUS_USER_ID: &str = "placeholder_user_id";

pub const BASE_URL_ENV: &str = "TIMETABLER_BASE_URL";
pub const USER_ID_ENV: &str = "TIMETABLER_USER_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid service URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Configuration for the generation and store clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the generation/persistence service
    pub base_url: Url,
    /// Identity sent with requests and used to list saved timetables
    pub user_id: String,
    pub connect_timeout_secs: u64,
    /// Generation can take up to a minute on the solver side
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// How long a listing of saved timetables stays cached
    pub list_cache_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_id: ANONYMOUS_USER_ID.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 90,
            user_agent: format!("timetabler/{}", env!("CARGO_PKG_VERSION")),
            list_cache_ttl_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Creates a config pointing at `base_url` with defaults elsewhere.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base(Url::parse(base_url)?),
            ..Default::default()
        })
    }

    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), ConfigError> {
        self.base_url = normalize_base(Url::parse(base_url)?);
        Ok(())
    }

    /// Replaces the user identity.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Loads a JSON config file; missing keys keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config: ClientConfig = serde_json::from_str(&content)?;
        config.base_url = normalize_base(config.base_url);
        Ok(config)
    }

    /// Applies `TIMETABLER_BASE_URL` and `TIMETABLER_USER_ID` when set.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            self.set_base_url(&base_url)?;
        }
        if let Ok(user_id) = env::var(USER_ID_ENV) {
            if !user_id.trim().is_empty() {
                self.user_id = user_id;
            }
        }
        Ok(self)
    }

    /// Resolves a path relative to the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn list_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.list_cache_ttl_secs)
    }

    /// HTTP client with this config's timeouts and user agent.
    pub(crate) fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(self.connect_timeout())
            .timeout(self.request_timeout())
            .build()
    }
}

/// `Url::join` drops the last path segment unless the base ends with '/'.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
