use crate::message::Message;

use std::error::Error;

use async_trait::async_trait;

/// Marker trait for subscription handler errors.
pub trait SubscriptionHandlerError: Error + Send + Sync + 'static {}

/// Processes messages delivered to a subscription.
///
/// A handler is cloned into a separate task for each delivery, so several
/// invocations may run at the same time.
#[async_trait]
pub trait SubscriptionHandler
where
    Self: Clone + Send + Sync + 'static,
{
    /// The error type for the handler.
    type Error: SubscriptionHandlerError;

    /// Handles a single delivered message.
    async fn handle(&self, message: Message) -> Result<(), Self::Error>;
}
