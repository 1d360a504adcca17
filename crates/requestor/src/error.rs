use demo_messaging::BrokerError;
use thiserror::Error;

/// Errors that can occur while running a requestor.
#[derive(Debug, Error)]
pub enum Error<B>
where
    B: BrokerError,
{
    /// `start` was called more than once.
    #[error("requestor already started")]
    AlreadyStarted,

    /// Closing the broker connection failed.
    #[error("failed to close connection: {0}")]
    Close(#[source] B),
}
