//! Transport adapters.
//!
//! A transport performs one GET per call and hands back the raw status and body;
//! classification is left to the caller.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EvcConfig;
use crate::error::ClientError;

/// Query parameters of one request, credentials excluded.
pub type Params = [(&'static str, String)];

/// Status and body of an HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// A `200 OK` response with the given body.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Sends one request to the EVC backend.
///
/// Implementations add the credentials themselves and must be safe to share
/// between concurrent callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `params` and return the raw answer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] when no HTTP answer could be obtained.
    async fn send(&self, params: &Params) -> Result<RawResponse, ClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, params: &Params) -> Result<RawResponse, ClientError> {
        (**self).send(params).await
    }
}

/// Transport talking to the real endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    api_id: String,
    username: String,
    password: String,
}

impl HttpTransport {
    /// Create a transport from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the configuration is incomplete or
    /// the HTTP client cannot be built.
    pub fn new(config: &EvcConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
            api_id: config.api_id.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Endpoint receiving the requests.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, params: &Params) -> Result<RawResponse, ClientError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("apiid", self.api_id.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        query.extend(params.iter().map(|(key, value)| (*key, value.as_str())));

        let response = self.client.get(&self.url).query(&query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
