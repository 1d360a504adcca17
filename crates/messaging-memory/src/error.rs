use demo_messaging::{BrokerError, SubscriberError};
use thiserror::Error;

/// Errors that can occur in the in-memory broker.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The broker was closed.
    #[error("broker closed")]
    Closed,

    /// The subject is not valid for the attempted operation.
    #[error(transparent)]
    Subject(#[from] demo_messaging::subject::Error),

    /// No reply arrived before the request timeout elapsed.
    #[error("request timed out")]
    Timeout,
}

impl BrokerError for Error {
    fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl SubscriberError for Error {}
