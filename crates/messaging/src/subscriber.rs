use crate::message::Message;

use std::error::Error;

use async_trait::async_trait;

/// Marker trait for subscriber errors.
pub trait SubscriberError: Error + Send + Sync + 'static {}

/// The receiving end of a subscription registered with a broker.
#[async_trait]
pub trait Subscriber
where
    Self: Send + 'static,
{
    /// The error type for the subscriber.
    type Error: SubscriberError;

    /// Waits for the next delivered message. Returns `None` once the
    /// subscription has ended.
    async fn next(&mut self) -> Option<Message>;

    /// Stops further deliveries to this subscriber and discards anything
    /// not yet read.
    async fn unsubscribe(&mut self) -> Result<(), Self::Error>;

    /// Stops further deliveries to this subscriber. Messages the broker
    /// already handed over stay readable through `next`, which returns
    /// `None` once they are exhausted.
    async fn drain(&mut self) -> Result<(), Self::Error>;
}
