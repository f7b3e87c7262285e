//! Shutdown coordination.

use tokio_util::sync::CancellationToken;

/// Coordinator for cooperative shutdown.
///
/// Wraps the root cancel token that every long-running operation observes.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Root token; pass this (or a child of it) to operations.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once shutdown has been triggered.
    pub async fn triggered(&self) {
        self.token.cancelled().await;
    }
}
