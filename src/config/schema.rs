//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.
//! Cluster settings are also the bootstrap request body, so their
//! serialized (JSON) field names follow the node's API while the TOML keys
//! stay snake_case.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::PollConfig;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CdmConfig {
    /// Node connection settings.
    pub node: NodeConfig,

    /// Optional API credentials (not needed for bootstrap endpoints).
    pub credentials: Option<CredentialsConfig>,

    /// Polling behaviour for waits.
    pub polling: PollingConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Cluster definition used by `bootstrap`.
    pub cluster: Option<ClusterConfig>,
}

/// Node connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node host or IP, optionally with port (e.g., "10.0.0.10").
    pub address: String,

    /// URL scheme ("https" for appliances, "http" for local testing).
    pub scheme: String,

    /// Accept self-signed certificates.
    pub allow_insecure_tls: bool,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl NodeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            scheme: "https".to_string(),
            allow_insecure_tls: true,
            request_timeout_secs: 30,
        }
    }
}

/// API credentials: either username/password or a token.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// How long continuous probe failures are tolerated, in seconds.
    pub grace_timeout_secs: u64,

    /// Interval between bootstrap status probes, in seconds.
    pub status_interval_secs: u64,

    /// Interval between is-bootstrapped probes, in seconds.
    pub ready_interval_secs: u64,
}

impl PollingConfig {
    pub fn grace_timeout(&self) -> Duration {
        Duration::from_secs(self.grace_timeout_secs)
    }

    pub fn status_poll(&self) -> PollConfig {
        PollConfig::new(self.grace_timeout(), Duration::from_secs(self.status_interval_secs))
    }

    pub fn ready_poll(&self) -> PollConfig {
        PollConfig::new(self.grace_timeout(), Duration::from_secs(self.ready_interval_secs))
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            grace_timeout_secs: 240,
            status_interval_secs: 10,
            ready_interval_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    /// `RUST_LOG` overrides it.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Cluster definition submitted to the bootstrap endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterConfig {
    /// Cluster name.
    pub name: String,

    /// Initial admin account.
    #[serde(rename(serialize = "adminUserInfo"))]
    pub admin: AdminUser,

    #[serde(default, rename(serialize = "dnsNameservers"))]
    pub dns_name_servers: Vec<String>,

    #[serde(default, rename(serialize = "dnsSearchDomains"))]
    pub dns_search_domains: Vec<String>,

    #[serde(
        default,
        rename(serialize = "ntpServerConfigs"),
        serialize_with = "serialize_ntp_servers"
    )]
    pub ntp_servers: Vec<String>,

    #[serde(default, rename(serialize = "enableSoftwareEncryptionAtRest"))]
    pub enable_encryption: bool,

    #[serde(
        default,
        rename(serialize = "managementGateway"),
        skip_serializing_if = "Option::is_none"
    )]
    pub management_gateway: Option<String>,

    #[serde(
        default,
        rename(serialize = "managementSubnetMask"),
        skip_serializing_if = "Option::is_none"
    )]
    pub management_subnet_mask: Option<String>,

    /// Nodes keyed by node ID.
    #[serde(rename(serialize = "nodeConfigs"))]
    pub nodes: BTreeMap<String, ClusterNode>,

    /// Object storage for cloud clusters with elastic storage.
    #[serde(
        default,
        rename(serialize = "cloudStorageLocation"),
        skip_serializing_if = "Option::is_none"
    )]
    pub cloud_storage: Option<CloudStorage>,
}

/// Admin account created during bootstrap.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminUser {
    #[serde(default = "default_admin_id")]
    pub id: String,
    #[serde(rename(serialize = "emailAddress"))]
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_admin_id() -> String {
    "admin".to_string()
}

/// A single node of the cluster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterNode {
    #[serde(rename(serialize = "managementIpConfig"), serialize_with = "serialize_ip_config")]
    pub management_ip: String,
}

/// Cloud object storage backing a cluster.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum CloudStorage {
    Aws {
        bucket: String,
        #[serde(default, rename(serialize = "enableImmutability"))]
        immutable: bool,
    },
    Azure {
        #[serde(rename(serialize = "connectionString"))]
        connection_string: String,
        container: String,
        #[serde(default, rename(serialize = "enableImmutability"))]
        immutable: bool,
    },
}

fn serialize_ntp_servers<S>(servers: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    #[derive(Serialize)]
    struct NtpServer<'a> {
        server: &'a str,
    }
    serializer.collect_seq(servers.iter().map(|server| NtpServer { server }))
}

fn serialize_ip_config<S>(address: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    #[derive(Serialize)]
    struct IpConfig<'a> {
        address: &'a str,
    }
    IpConfig { address }.serialize(serializer)
}
