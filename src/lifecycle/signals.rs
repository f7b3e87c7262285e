//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl-C) or, on unix, SIGTERM
//! - Translate the first one into a shutdown trigger

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Resolve when the process is asked to stop.
pub async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = term.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Spawn a task that triggers `shutdown` on the first stop signal.
///
/// The task also ends, without triggering, if shutdown is triggered
/// elsewhere first.
pub fn cancel_on_signal(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_signal() => match res {
                Ok(()) => {
                    tracing::warn!("Stop signal received, cancelling");
                    shutdown.trigger();
                }
                Err(e) => tracing::error!(error = %e, "Failed to listen for signals"),
            },
            _ = shutdown.triggered() => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_exits_on_external_trigger() {
        let shutdown = Shutdown::new();
        let handle = cancel_on_signal(shutdown.clone());
        shutdown.trigger();
        handle.await.unwrap();
    }
}
