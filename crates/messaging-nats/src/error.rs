use demo_messaging::{BrokerError, SubscriberError};
use thiserror::Error;

/// Errors that can occur when talking to a NATS server.
#[derive(Debug, Error)]
pub enum Error {
    /// The connection was closed with `close`.
    #[error("connection closed")]
    Closed,

    /// Could not connect to any of the configured servers.
    #[error("failed to connect: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// Flush error.
    #[error("failed to flush: {0}")]
    Flush(#[from] async_nats::client::FlushError),

    /// The server reported that nothing is subscribed to the request subject.
    #[error("no responders on subject")]
    NoResponders,

    /// Publish error.
    #[error("failed to publish: {0}")]
    Publish(#[from] async_nats::client::PublishError),

    /// Request error other than a timeout.
    #[error("request failed: {0}")]
    Request(#[source] async_nats::client::RequestError),

    /// Subscribe error.
    #[error("failed to subscribe: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// No reply arrived before the request timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// Unsubscribe error.
    #[error("failed to unsubscribe: {0}")]
    Unsubscribe(#[from] async_nats::UnsubscribeError),
}

impl From<async_nats::client::RequestError> for Error {
    fn from(error: async_nats::client::RequestError) -> Self {
        use async_nats::client::RequestErrorKind;

        match error.kind() {
            RequestErrorKind::TimedOut => Self::Timeout,
            RequestErrorKind::NoResponders => Self::NoResponders,
            _ => Self::Request(error),
        }
    }
}

impl BrokerError for Error {
    fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl SubscriberError for Error {}
