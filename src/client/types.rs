//! Client types and error definitions.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::CredentialsConfig;

/// API namespace of a node endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    Internal,
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::Internal => "internal",
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How requests authenticate against the node.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Token(String),
}

impl Credentials {
    /// Build credentials from a validated config section.
    ///
    /// Returns `None` when the section carries neither a token nor a
    /// username.
    pub fn from_config(config: &CredentialsConfig) -> Option<Self> {
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            return Some(Credentials::Token(token.to_string()));
        }
        let username = config.username.as_deref().filter(|u| !u.is_empty())?;
        Some(Credentials::Basic {
            username: username.to_string(),
            password: config.password.clone().unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Node address could not be turned into a URL.
    #[error("invalid node URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection, TLS or protocol failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No complete response within the per-request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Node answered with a non-success status.
    #[error("unexpected status {code}: {body}")]
    Status { code: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller's cancel token fired.
    #[error("request cancelled")]
    Canceled,
}

impl ClientError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ClientError::InvalidUrl { .. } => "client_invalid_url",
            ClientError::Request(_) => "client_request",
            ClientError::Timeout(_) => "client_timeout",
            ClientError::Status { .. } => "client_status",
            ClientError::Decode(_) => "client_decode",
            ClientError::Canceled => "client_canceled",
        }
    }

    /// HTTP status code, when the node answered with one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status { code, .. } => Some(*code),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
