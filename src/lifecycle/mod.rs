//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → cancel token fires → in-flight waits return Canceled → Exit
//! ```
//!
//! # Design Decisions
//! - One root cancel token per process; operations get clones or children
//! - Cancellation is cooperative: nothing is aborted from outside a task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{cancel_on_signal, wait_for_signal};
