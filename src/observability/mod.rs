//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (node, attempt, error, ...)
//!
//! Consumers:
//!     → logging.rs (stderr, pretty / compact / json)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - JSON format for log shipping, pretty format for interactive use

pub mod logging;

pub use logging::init_logging;
