//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, interval within grace period)
//! - Check credentials are complete and unambiguous
//! - Check the cluster definition before it is sent to a node
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CdmConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::IpAddr;

use crate::config::schema::{CdmConfig, CloudStorage, ClusterConfig, CredentialsConfig};

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. "polling.grace_timeout_secs").
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a full configuration.
pub fn validate_config(config: &CdmConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let node = &config.node;
    if node.address.trim().is_empty() {
        errors.push(ValidationError::new("node.address", "must not be empty"));
    }
    if node.scheme != "https" && node.scheme != "http" {
        errors.push(ValidationError::new(
            "node.scheme",
            format!("unsupported scheme '{}', expected https or http", node.scheme),
        ));
    }
    if node.request_timeout_secs == 0 {
        errors.push(ValidationError::new("node.request_timeout_secs", "must be > 0"));
    }

    let polling = &config.polling;
    if polling.grace_timeout_secs == 0 {
        errors.push(ValidationError::new("polling.grace_timeout_secs", "must be > 0"));
    }
    for (field, interval) in [
        ("polling.status_interval_secs", polling.status_interval_secs),
        ("polling.ready_interval_secs", polling.ready_interval_secs),
    ] {
        if interval == 0 {
            errors.push(ValidationError::new(field, "must be > 0"));
        } else if interval > polling.grace_timeout_secs {
            errors.push(ValidationError::new(
                field,
                "must not exceed polling.grace_timeout_secs",
            ));
        }
    }

    if let Some(credentials) = &config.credentials {
        check_credentials(credentials, &mut errors);
    }

    if let Some(cluster) = &config.cluster {
        if let Err(cluster_errors) = validate_cluster(cluster) {
            errors.extend(cluster_errors.into_iter().map(|e| ValidationError {
                field: format!("cluster.{}", e.field),
                message: e.message,
            }));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_credentials(credentials: &CredentialsConfig, errors: &mut Vec<ValidationError>) {
    let has_user = credentials.username.as_deref().is_some_and(|u| !u.is_empty());
    let has_password = credentials.password.as_deref().is_some_and(|p| !p.is_empty());
    let has_token = credentials.token.as_deref().is_some_and(|t| !t.is_empty());

    match (has_user || has_password, has_token) {
        (true, true) => errors.push(ValidationError::new(
            "credentials",
            "set either username/password or token, not both",
        )),
        (false, false) => errors.push(ValidationError::new(
            "credentials",
            "username/password or token required",
        )),
        (true, false) if !(has_user && has_password) => errors.push(ValidationError::new(
            "credentials",
            "username and password must both be set",
        )),
        _ => {}
    }
}

/// Validate a cluster definition. Field paths are relative to the cluster.
pub fn validate_cluster(cluster: &ClusterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if cluster.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "must not be empty"));
    }
    if cluster.admin.email.trim().is_empty() {
        errors.push(ValidationError::new("admin.email", "must not be empty"));
    }
    if cluster.admin.password.is_empty() {
        errors.push(ValidationError::new("admin.password", "must not be empty"));
    }
    if cluster.ntp_servers.is_empty() {
        errors.push(ValidationError::new("ntp_servers", "at least one NTP server required"));
    }
    if cluster.nodes.is_empty() {
        errors.push(ValidationError::new("nodes", "at least one node required"));
    }
    for (id, node) in &cluster.nodes {
        if node.management_ip.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::new(
                format!("nodes.{id}.management_ip"),
                format!("'{}' is not an IP address", node.management_ip),
            ));
        }
    }
    for (field, value) in [
        ("management_gateway", &cluster.management_gateway),
        ("management_subnet_mask", &cluster.management_subnet_mask),
    ] {
        if let Some(value) = value {
            if value.parse::<IpAddr>().is_err() {
                errors.push(ValidationError::new(
                    field,
                    format!("'{value}' is not an IP address"),
                ));
            }
        }
    }
    match &cluster.cloud_storage {
        Some(CloudStorage::Aws { bucket, .. }) if bucket.trim().is_empty() => {
            errors.push(ValidationError::new("cloud_storage.bucket", "must not be empty"));
        }
        Some(CloudStorage::Azure {
            connection_string,
            container,
            ..
        }) => {
            if connection_string.trim().is_empty() {
                errors.push(ValidationError::new(
                    "cloud_storage.connection_string",
                    "must not be empty",
                ));
            }
            if container.trim().is_empty() {
                errors.push(ValidationError::new("cloud_storage.container", "must not be empty"));
            }
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AdminUser, ClusterNode};
    use std::collections::BTreeMap;

    fn valid_config() -> CdmConfig {
        let mut config = CdmConfig::default();
        config.node.address = "10.0.0.10".into();
        config
    }

    fn valid_cluster() -> ClusterConfig {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "node-1".to_string(),
            ClusterNode {
                management_ip: "10.0.0.11".into(),
            },
        );
        ClusterConfig {
            name: "c1".into(),
            admin: AdminUser {
                id: "admin".into(),
                email: "ops@example.com".into(),
                password: "hunter2hunter2".into(),
            },
            dns_name_servers: vec!["10.0.0.2".into()],
            dns_search_domains: Vec::new(),
            ntp_servers: vec!["pool.ntp.org".into()],
            enable_encryption: true,
            management_gateway: None,
            management_subnet_mask: None,
            nodes,
            cloud_storage: None,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = CdmConfig::default();
        config.node.request_timeout_secs = 0;
        config.polling.grace_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"node.address"));
        assert!(fields.contains(&"node.request_timeout_secs"));
        assert!(fields.contains(&"polling.grace_timeout_secs"));
    }

    #[test]
    fn test_interval_must_fit_in_grace() {
        let mut config = valid_config();
        config.polling.grace_timeout_secs = 5;
        config.polling.status_interval_secs = 10;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "polling.status_interval_secs");
    }

    #[test]
    fn test_credentials_rules() {
        let mut config = valid_config();
        config.credentials = Some(CredentialsConfig {
            username: Some("admin".into()),
            password: None,
            token: None,
        });
        assert!(validate_config(&config).is_err());

        config.credentials = Some(CredentialsConfig {
            username: Some("admin".into()),
            password: Some("pw".into()),
            token: Some("tok".into()),
        });
        assert!(validate_config(&config).is_err());

        config.credentials = Some(CredentialsConfig {
            username: None,
            password: None,
            token: Some("tok".into()),
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_cluster_checks() {
        assert!(validate_cluster(&valid_cluster()).is_ok());

        let mut cluster = valid_cluster();
        cluster.nodes.insert(
            "node-2".into(),
            ClusterNode {
                management_ip: "not-an-ip".into(),
            },
        );
        cluster.ntp_servers.clear();
        let errors = validate_cluster(&cluster).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "nodes.node-2.management_ip"));

        let mut config = valid_config();
        config.cluster = Some(cluster);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().all(|e| e.field.starts_with("cluster.")));
    }
}
