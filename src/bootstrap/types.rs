//! Bootstrap request/response types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientError;
use crate::resilience::{PollError, TerminalStatus};

// Re-export ClusterConfig from config module to avoid duplication
pub use crate::config::schema::{AdminUser, CloudStorage, ClusterConfig, ClusterNode};

/// Identifier of a bootstrap request, returned by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BootstrapRequestId(pub u64);

impl From<u64> for BootstrapRequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BootstrapRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `GET internal/node_management/is_bootstrapped`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IsBootstrappedResponse {
    pub value: bool,
}

/// Body of `POST internal/cluster/me/bootstrap`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BootstrapResponse {
    pub id: BootstrapRequestId,
}

/// Overall state of a bootstrap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    InProgress,
    Success,
    #[serde(alias = "FAILED")]
    Failure,
    #[serde(other)]
    Unknown,
}

/// Body of `GET internal/cluster/me/bootstrap?request_id={id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapStatus {
    pub status: RequestStatus,
    #[serde(default)]
    pub message: String,
}

impl BootstrapStatus {
    /// Map the node's answer onto the poller's terminal states.
    ///
    /// Unrecognized states keep the wait going.
    pub fn terminal(&self) -> TerminalStatus {
        match self.status {
            RequestStatus::Success => TerminalStatus::Success,
            RequestStatus::Failure if self.message.is_empty() => {
                TerminalStatus::Failure("bootstrap failed".to_string())
            }
            RequestStatus::Failure => TerminalStatus::Failure(self.message.clone()),
            RequestStatus::InProgress | RequestStatus::Unknown => TerminalStatus::InProgress,
        }
    }
}

/// Errors that can occur during bootstrap operations.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The node was already bootstrapped before the request was made.
    #[error("node {node} is already bootstrapped")]
    AlreadyBootstrapped { node: String },

    /// The cluster definition failed validation.
    #[error("invalid cluster configuration: {0}")]
    InvalidConfig(String),

    /// A single request to the node failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A wait ended without success.
    #[error(transparent)]
    Poll(#[from] PollError<ClientError>),
}

impl BootstrapError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BootstrapError::AlreadyBootstrapped { .. } => "bootstrap_already_done",
            BootstrapError::InvalidConfig(_) => "bootstrap_invalid_config",
            BootstrapError::Client(e) => e.as_label(),
            BootstrapError::Poll(e) => e.as_label(),
        }
    }

    /// Whether the error came from the caller's cancel token.
    pub fn is_canceled(&self) -> bool {
        matches!(
            self,
            BootstrapError::Poll(PollError::Canceled)
                | BootstrapError::Client(ClientError::Canceled)
        )
    }
}

/// Result type for bootstrap operations.
pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        let status: BootstrapStatus =
            serde_json::from_str(r#"{"status":"IN_PROGRESS","message":"","ipConfig":"SUCCESS"}"#)
                .unwrap();
        assert_eq!(status.status, RequestStatus::InProgress);
        assert_eq!(status.terminal(), TerminalStatus::InProgress);

        let status: BootstrapStatus = serde_json::from_str(r#"{"status":"FAILED"}"#).unwrap();
        assert_eq!(status.terminal(), TerminalStatus::Failure("bootstrap failed".into()));

        let status: BootstrapStatus =
            serde_json::from_str(r#"{"status":"RESTARTING","message":"x"}"#).unwrap();
        assert_eq!(status.status, RequestStatus::Unknown);
        assert_eq!(status.terminal(), TerminalStatus::InProgress);
    }

    #[test]
    fn test_failure_message_is_verbatim() {
        let status = BootstrapStatus {
            status: RequestStatus::Failure,
            message: "invalid configuration".into(),
        };
        assert_eq!(
            status.terminal(),
            TerminalStatus::Failure("invalid configuration".into())
        );
    }

    #[test]
    fn test_request_id() {
        let res: BootstrapResponse =
            serde_json::from_str(r#"{"id": 42, "status": "IN_PROGRESS"}"#).unwrap();
        assert_eq!(res.id, BootstrapRequestId(42));
        assert_eq!(res.id.to_string(), "42");
    }

    #[test]
    fn test_error_labels() {
        let err = BootstrapError::AlreadyBootstrapped {
            node: "10.0.0.10".into(),
        };
        assert_eq!(err.as_label(), "bootstrap_already_done");
        assert_eq!(err.to_string(), "node 10.0.0.10 is already bootstrapped");

        let err = BootstrapError::from(PollError::<ClientError>::Canceled);
        assert!(err.is_canceled());
        assert_eq!(err.as_label(), "poll_canceled");
    }
}
