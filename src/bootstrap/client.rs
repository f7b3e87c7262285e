//! Cluster bootstrap client.
//!
//! # Responsibilities
//! - Ask a node whether it is bootstrapped, riding out service restarts
//! - Submit a cluster definition, refusing if the node is already bootstrapped
//! - Wait for a bootstrap request to succeed or fail
//!
//! # Lifecycle
//! ```text
//! is_bootstrapped ──true──► AlreadyBootstrapped (no request sent)
//!        │
//!      false
//!        ▼
//! POST cluster/me/bootstrap ──► request id
//!        ▼
//! wait_for_bootstrap: poll status until SUCCESS / FAILURE / timeout / cancel
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::bootstrap::types::{
    BootstrapError, BootstrapRequestId, BootstrapResponse, BootstrapResult, BootstrapStatus,
    ClusterConfig, IsBootstrappedResponse,
};
use crate::client::{ApiVersion, CdmClient, ClientError, ClientResult, Credentials};
use crate::config::{validate_cluster, CdmConfig};
use crate::resilience::{poll, wait_until_ready, wait_until_terminal, PollConfig, ProbeStatus};

const IS_BOOTSTRAPPED_ENDPOINT: &str = "/node_management/is_bootstrapped";
const BOOTSTRAP_ENDPOINT: &str = "/cluster/me/bootstrap";

/// Default period between bootstrap status probes.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(10);

/// Default period between is-bootstrapped probes.
pub const DEFAULT_READY_INTERVAL: Duration = Duration::from_secs(5);

/// Drives the bootstrap endpoints of one node.
#[derive(Clone)]
pub struct BootstrapClient {
    client: CdmClient,
    status_interval: Duration,
    ready_interval: Duration,
}

impl BootstrapClient {
    /// Wrap an existing node client with default poll intervals.
    pub fn new(client: CdmClient) -> Self {
        Self {
            client,
            status_interval: DEFAULT_STATUS_INTERVAL,
            ready_interval: DEFAULT_READY_INTERVAL,
        }
    }

    /// Build from a loaded configuration.
    pub fn from_config(config: &CdmConfig) -> BootstrapResult<Self> {
        let credentials = config.credentials.as_ref().and_then(Credentials::from_config);
        let client = CdmClient::new(&config.node, credentials)?;
        Ok(Self::new(client).with_intervals(
            config.polling.status_poll().interval,
            config.polling.ready_poll().interval,
        ))
    }

    /// Override the poll intervals.
    pub fn with_intervals(mut self, status_interval: Duration, ready_interval: Duration) -> Self {
        self.status_interval = status_interval;
        self.ready_interval = ready_interval;
        self
    }

    /// Underlying node client.
    pub fn client(&self) -> &CdmClient {
        &self.client
    }

    async fn fetch_is_bootstrapped(&self, cancel: &CancellationToken) -> ClientResult<bool> {
        let res: IsBootstrappedResponse = self
            .client
            .get(cancel, ApiVersion::Internal, IS_BOOTSTRAPPED_ENDPOINT)
            .await?;
        Ok(res.value)
    }

    /// Ask whether the node is bootstrapped.
    ///
    /// A node that is still starting refuses connections or answers 404/503
    /// for a while; such failures are retried until they have persisted for
    /// `grace`. The first answer the node gives is returned.
    pub async fn is_bootstrapped(
        &self,
        cancel: &CancellationToken,
        grace: Duration,
    ) -> BootstrapResult<bool> {
        let config = PollConfig::new(grace, self.ready_interval);
        let bootstrapped = poll(&config, cancel, |token| async move {
            self.fetch_is_bootstrapped(&token)
                .await
                .map(ProbeStatus::Ready)
        })
        .await?;

        tracing::debug!(node = self.client.node(), bootstrapped, "Bootstrap state");
        Ok(bootstrapped)
    }

    /// Wait until the node reports itself bootstrapped.
    pub async fn wait_until_bootstrapped(
        &self,
        cancel: &CancellationToken,
        grace: Duration,
    ) -> BootstrapResult<()> {
        let config = PollConfig::new(grace, self.ready_interval);
        wait_until_ready(&config, cancel, |token| async move {
            self.fetch_is_bootstrapped(&token).await
        })
        .await?;

        tracing::info!(node = self.client.node(), "Node is bootstrapped");
        Ok(())
    }

    /// Submit `cluster` for bootstrap and return the request id.
    ///
    /// Fails with [`BootstrapError::AlreadyBootstrapped`] without sending
    /// anything if the node is already bootstrapped. The submission itself is
    /// not retried.
    pub async fn bootstrap_cluster(
        &self,
        cancel: &CancellationToken,
        cluster: &ClusterConfig,
        grace: Duration,
    ) -> BootstrapResult<BootstrapRequestId> {
        validate_cluster(cluster).map_err(|errors| {
            BootstrapError::InvalidConfig(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })?;

        if self.is_bootstrapped(cancel, grace).await? {
            return Err(BootstrapError::AlreadyBootstrapped {
                node: self.client.node().to_string(),
            });
        }

        let res: BootstrapResponse = self
            .client
            .post(cancel, ApiVersion::Internal, BOOTSTRAP_ENDPOINT, cluster)
            .await?;

        tracing::info!(
            node = self.client.node(),
            cluster = %cluster.name,
            nodes = cluster.nodes.len(),
            request_id = %res.id,
            "Bootstrap requested"
        );
        Ok(res.id)
    }

    /// Fetch the current state of a bootstrap request once.
    pub async fn bootstrap_status(
        &self,
        cancel: &CancellationToken,
        id: BootstrapRequestId,
    ) -> BootstrapResult<BootstrapStatus> {
        Ok(self.fetch_status(cancel, id).await?)
    }

    async fn fetch_status(
        &self,
        cancel: &CancellationToken,
        id: BootstrapRequestId,
    ) -> ClientResult<BootstrapStatus> {
        let endpoint = format!("{BOOTSTRAP_ENDPOINT}?request_id={id}");
        self.client.get(cancel, ApiVersion::Internal, &endpoint).await
    }

    /// Wait for a bootstrap request to finish.
    ///
    /// Returns once the node reports success. A reported failure ends the
    /// wait immediately with the node's message. Request errors (the node
    /// restarts services several times while bootstrapping) are tolerated
    /// until they have persisted for `grace`.
    pub async fn wait_for_bootstrap(
        &self,
        cancel: &CancellationToken,
        id: BootstrapRequestId,
        grace: Duration,
    ) -> BootstrapResult<()> {
        let config = PollConfig::new(grace, self.status_interval);
        wait_until_terminal(&config, cancel, |token| async move {
            let status = self.fetch_status(&token, id).await?;
            tracing::debug!(request_id = %id, status = ?status.status, "Bootstrap progress");
            Ok::<_, ClientError>(status.terminal())
        })
        .await?;

        tracing::info!(node = self.client.node(), request_id = %id, "Bootstrap complete");
        Ok(())
    }
}
