//! Client configuration.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::error::ClientError;

/// Reseller-credit endpoint of evc.de.
pub const DEFAULT_API_URL: &str = "https://evc.de/services/api_resellercredits.asp";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for the EVC API.
///
/// The api id, username and password are required and must not be empty.
#[derive(Clone)]
pub struct EvcConfig {
    /// Endpoint receiving the GET requests (default: [`DEFAULT_API_URL`]).
    pub api_url: String,

    /// Api id provided by evc.de.
    pub api_id: String,

    /// Reseller number.
    pub username: String,

    /// Api password.
    pub password: String,

    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

/// Secrets file structure.
#[derive(Debug, Deserialize)]
struct EvcSecrets {
    api_id: String,
    username: String,
    password: String,
    #[serde(default)]
    api_url: Option<String>,
}

impl EvcConfig {
    /// Create a configuration for the default endpoint.
    #[must_use]
    pub fn new(
        api_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_id: api_id.into(),
            username: username.into(),
            password: password.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Set the API URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Load configuration from a secrets file or, failing that, the environment.
    ///
    /// The secrets file is looked up at `$EVC_SECRETS_FILE`, `.secrets/evc.json` and
    /// `evc/.secrets/evc.json`. Without one, `EVC_API_ID`, `EVC_USERNAME` and
    /// `EVC_PASSWORD` are read. `EVC_API_URL` and `EVC_TIMEOUT_SECONDS` override the
    /// defaults in both cases.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when a credential is missing or empty.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = match load_secrets() {
            Some(config) => config,
            None => Self::new(
                required_env("EVC_API_ID")?,
                required_env("EVC_USERNAME")?,
                required_env("EVC_PASSWORD")?,
            ),
        };

        if let Ok(url) = std::env::var("EVC_API_URL") {
            config.api_url = url;
        }

        if let Some(seconds) = std::env::var("EVC_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout_seconds = seconds;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON secrets file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the file cannot be read, is not
    /// valid JSON, or holds an empty credential.
    pub fn from_secrets_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let secrets: EvcSecrets = serde_json::from_str(&contents).map_err(|e| {
            ClientError::Configuration(format!("invalid secrets file {}: {e}", path.display()))
        })?;

        let mut config = Self::new(secrets.api_id, secrets.username, secrets.password);
        if let Some(url) = secrets.api_url {
            config.api_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every required value is present.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] naming the first empty value, or when
    /// the timeout is zero.
    pub fn validate(&self) -> Result<(), ClientError> {
        let required = [
            ("api_url", &self.api_url),
            ("api_id", &self.api_id),
            ("username", &self.username),
            ("password", &self.password),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ClientError::Configuration(format!(
                    "{name} must not be empty"
                )));
            }
        }

        if self.timeout_seconds == 0 {
            return Err(ClientError::Configuration(
                "timeout_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for EvcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvcConfig")
            .field("api_url", &self.api_url)
            .field("api_id", &self.api_id)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn required_env(name: &str) -> Result<String, ClientError> {
    std::env::var(name).map_err(|_| ClientError::Configuration(format!("{name} is not set")))
}

/// Load the first readable secrets file.
fn load_secrets() -> Option<EvcConfig> {
    let explicit = std::env::var("EVC_SECRETS_FILE").ok();
    let candidates = explicit
        .iter()
        .map(String::as_str)
        .chain([".secrets/evc.json", "evc/.secrets/evc.json"]);

    for path in candidates {
        if !Path::new(path).exists() {
            continue;
        }
        match EvcConfig::from_secrets_file(path) {
            Ok(config) => {
                tracing::info!(path, "Loaded EVC secrets from file");
                return Some(config);
            }
            Err(e) => tracing::warn!(path, error = %e, "Ignoring EVC secrets file"),
        }
    }

    None
}
