use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur while draining a subscription.
#[derive(Debug, Error)]
pub enum Error<E>
where
    E: StdError + Send + Sync + 'static,
{
    /// The dispatch task panicked or was aborted.
    #[error("subscription dispatcher failed: {0}")]
    Dispatcher(#[source] tokio::task::JoinError),

    /// The broker refused to remove the subscription.
    #[error("failed to unsubscribe: {0}")]
    Unsubscribe(#[source] E),
}
