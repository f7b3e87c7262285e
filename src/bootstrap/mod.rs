//! Cluster bootstrap subsystem.
//!
//! # Data Flow
//! ```text
//! ClusterConfig (from config file)
//!     → client.rs (precondition check, submit, wait)
//!     → resilience::poller (bounded-retry polling)
//!     → client::CdmClient (HTTP round trips)
//! ```
//!
//! # Design Decisions
//! - "Already bootstrapped" is checked once, before anything is submitted,
//!   and is a hard error rather than a success
//! - The bootstrap submission is never retried; only read-only probes are
//! - A failure reported by the node is surfaced verbatim and never retried

pub mod client;
pub mod types;

pub use client::{BootstrapClient, DEFAULT_READY_INTERVAL, DEFAULT_STATUS_INTERVAL};
pub use types::{
    BootstrapError, BootstrapRequestId, BootstrapResult, BootstrapStatus, RequestStatus,
};
