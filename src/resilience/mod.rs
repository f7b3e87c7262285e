//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Wait for a node-side condition:
//!     → poller.rs (tick, probe, classify outcome)
//!     → timer.rs (latch transient failures, expire after grace period)
//!     → timeouts.rs (bound each probe round trip, honor cancellation)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline and a cancel token
//! - Transient failures are tolerated for a continuous grace period, not a
//!   retry count
//! - Authoritative failures reported by the target are never retried

pub mod poller;
pub mod timeouts;
pub mod timer;

pub use poller::{
    poll, wait_until_ready, wait_until_terminal, PollConfig, PollError, ProbeStatus,
    TerminalStatus,
};
pub use timer::RetryTimer;
