//! Client error types.

/// Errors that can occur when using the EVC client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP exchange failed or returned a non-200 status.
    #[error("network error: {message}")]
    Network {
        /// Error message.
        message: String,
        /// HTTP status code, when a response was received.
        status: Option<u16>,
    },

    /// The backend refused the api id, user, password or verb.
    #[error("credential error: {0}")]
    Credential(String),

    /// The backend answered with an unexpected or rejecting body.
    #[error("unexpected evc message: {0}")]
    Logic(String),

    /// A parameter was rejected before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether the request never got a usable HTTP answer.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether the credentials should be checked.
    #[must_use]
    pub const fn is_credential(&self) -> bool {
        matches!(self, Self::Credential(_))
    }

    /// Whether the backend answered with something unexpected.
    #[must_use]
    pub const fn is_logic(&self) -> bool {
        matches!(self, Self::Logic(_))
    }

    /// Whether a parameter was rejected locally.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// The request URL carries the credentials, so it is stripped from the message.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        Self::Network {
            message: err.without_url().to_string(),
            status,
        }
    }
}
