//! CDM cluster bootstrap client.
//!
//! Bootstraps a CDM cluster through one of its nodes and waits for the
//! node-side work to finish, riding out the service restarts that happen
//! along the way.
//!
//! # Architecture Overview
//!
//! ```text
//!   cdm-bootstrap CLI (main.rs)
//!        │  config::load_config, observability::init_logging,
//!        │  lifecycle::cancel_on_signal
//!        ▼
//!   ┌───────────────┐   poll / wait_until_ready / wait_until_terminal
//!   │   bootstrap   │──────────────────────────────┐
//!   │ BootstrapClient│                             ▼
//!   └──────┬────────┘                     ┌─────────────────┐
//!          │ get / post                   │   resilience    │
//!          ▼                              │ poller + timer  │
//!   ┌───────────────┐  timeouts::bounded  └─────────────────┘
//!   │    client     │◀───────────────────────────┘
//!   │   CdmClient   │──── HTTPS ────▶ CDM node /api/{internal,v1,v2}/...
//!   └───────────────┘
//! ```

// Core subsystems
pub mod bootstrap;
pub mod client;
pub mod config;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use bootstrap::{BootstrapClient, BootstrapError};
pub use client::{CdmClient, ClientError};
pub use config::schema::CdmConfig;
pub use lifecycle::Shutdown;
pub use resilience::{wait_until_ready, wait_until_terminal, PollConfig, PollError};
