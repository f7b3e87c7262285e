//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a single node round trip with a deadline
//! - Abort the round trip when the caller's token is cancelled
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout and cancellation errors are distinct from transport errors

use std::future::Future;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::client::ClientError;

/// Run `fut` with a deadline of `limit`, aborting early if `cancel` fires.
pub async fn bounded<T, F>(
    cancel: &CancellationToken,
    limit: Duration,
    fut: F,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Canceled),
        res = time::timeout(limit, fut) => match res {
            Ok(inner) => inner,
            Err(_) => Err(ClientError::Timeout(limit)),
        },
    }
}
