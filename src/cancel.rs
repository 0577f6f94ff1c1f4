//! Cancellation of remote-call boundaries.
//!
//! Every catalog fetch and stream resolution is awaited through
//! [`cancellable`], so a cancelled browse or refresh request abandons all of
//! its in-flight calls at their next poll.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use trailerforge_common::{Error, Result};

/// Await `fut` unless `token` is cancelled first, in which case the future is
/// dropped and [`Error::Cancelled`] is returned.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
