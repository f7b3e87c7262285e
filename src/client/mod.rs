//! Node REST client subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (bootstrap client, CLI)
//!     → http.rs (URL, auth, timeout, cancel)
//!     → reqwest → node `/api/{version}{endpoint}`
//!     → types.rs (status/decode errors)
//! ```
//!
//! # Design Decisions
//! - One client per node; cheap to clone (shared connection pool)
//! - Every call takes the caller's cancel token
//! - Non-success statuses are errors carrying the response body

pub mod http;
pub mod types;

pub use http::CdmClient;
pub use types::{ApiVersion, ClientError, ClientResult, Credentials};
