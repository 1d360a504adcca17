use demo_messaging::subscription::Error as SubscriptionError;
use demo_messaging::{BrokerError, SubscriberError};
use thiserror::Error;

/// Errors that can occur while running a replier.
#[derive(Debug, Error)]
pub enum Error<B, S>
where
    B: BrokerError,
    S: SubscriberError,
{
    /// `start` was called more than once.
    #[error("replier already started")]
    AlreadyStarted,

    /// Draining the subscription failed.
    #[error("failed to drain subscription: {0}")]
    Drain(#[source] SubscriptionError<S>),

    /// Flushing outstanding replies failed.
    #[error("failed to flush replies: {0}")]
    Flush(#[source] B),

    /// Registering the queue subscription failed.
    #[error("couldn't subscribe: {0}")]
    Subscribe(#[source] B),
}
