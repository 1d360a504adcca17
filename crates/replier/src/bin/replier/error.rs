use demo_messaging_nats::NatsBroker;
use demo_replier::ReplierError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Could not connect to the NATS server.
    #[error("Can't connect: {0}")]
    Connect(#[source] demo_messaging_nats::Error),

    /// Could not listen for the interrupt signal.
    #[error("failed to listen for interrupt: {0}")]
    Signal(#[from] std::io::Error),

    /// Replier error.
    #[error(transparent)]
    Replier(#[from] ReplierError<NatsBroker>),

    /// Could not set global default subscriber.
    #[error("could not set global default subscriber: {0}")]
    SetTracing(#[from] tracing::dispatcher::SetGlobalDefaultError),
}
