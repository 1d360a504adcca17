use crate::message::Message;
use crate::subscriber::Subscriber;

use std::error::Error;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// Marker trait for broker errors.
pub trait BrokerError: Error + Send + Sync + 'static {
    /// Whether the error means a request got no reply within its timeout.
    fn is_timeout(&self) -> bool {
        false
    }
}

/// A handle to a publish/subscribe broker.
///
/// Handles are cheap to clone and every clone shares the same underlying
/// connection.
#[async_trait]
pub trait Broker
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// The error type for the broker.
    type Error: BrokerError;

    /// The subscriber type returned by `subscribe` and `queue_subscribe`.
    type SubscriberType: Subscriber;

    /// Publish a payload to a subject.
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), Self::Error>;

    /// Publish a payload to a subject, asking receivers to respond on `reply`.
    async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), Self::Error>;

    /// Receive every message published to subjects matching `subject`.
    async fn subscribe(&self, subject: &str) -> Result<Self::SubscriberType, Self::Error>;

    /// Join `queue_group` on `subject`. Each matching message is delivered to
    /// only one member of the group.
    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Self::SubscriberType, Self::Error>;

    /// Publish a payload and wait up to `timeout` for a single response.
    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Message, Self::Error>;

    /// Wait until every buffered outbound message has been handed to the broker.
    async fn flush(&self) -> Result<(), Self::Error>;

    /// Close the connection without waiting for in-flight work.
    async fn close(&self) -> Result<(), Self::Error>;
}
