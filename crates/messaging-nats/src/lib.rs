//! NATS implementation of the messaging crate.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod subscriber;

pub use error::Error;
pub use subscriber::NatsSubscriber;

use std::sync::Arc;
use std::time::Duration;

use async_nats::Client;
use async_trait::async_trait;
use bytes::Bytes;
use demo_messaging::{Broker, Message};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Default server used when none is configured.
pub const DEFAULT_URL: &str = "nats://127.0.0.1:4222";

/// A broker handle backed by a NATS connection.
///
/// Clones share the connection. After [`Broker::close`] every operation on
/// any clone fails with [`Error::Closed`].
#[derive(Clone, Debug)]
pub struct NatsBroker {
    client: Arc<RwLock<Option<Client>>>,
}

impl NatsBroker {
    /// Connects to the first reachable server in `servers`.
    ///
    /// No reconnect loop runs before the first connection succeeds; an
    /// unreachable cluster is reported immediately.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connect` if a server address cannot be parsed or no
    /// server accepts the connection.
    pub async fn connect(servers: &[String]) -> Result<Self, Error> {
        let addrs = servers.join(",");
        let client = async_nats::connect(addrs.as_str()).await?;

        info!("connected to nats at {}", addrs);

        Ok(Self::from_client(client))
    }

    /// Wraps an existing connection.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self {
            client: Arc::new(RwLock::new(Some(client))),
        }
    }

    fn client(&self) -> Result<Client, Error> {
        self.client.read().clone().ok_or(Error::Closed)
    }
}

#[async_trait]
impl Broker for NatsBroker {
    type Error = Error;

    type SubscriberType = NatsSubscriber;

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), Self::Error> {
        self.client()?.publish(subject.to_string(), payload).await?;

        Ok(())
    }

    async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), Self::Error> {
        self.client()?
            .publish_with_reply(subject.to_string(), reply.to_string(), payload)
            .await?;

        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<Self::SubscriberType, Self::Error> {
        let subscriber = self.client()?.subscribe(subject.to_string()).await?;

        Ok(NatsSubscriber::new(subscriber))
    }

    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Self::SubscriberType, Self::Error> {
        let subscriber = self
            .client()?
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await?;

        Ok(NatsSubscriber::new(subscriber))
    }

    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Message, Self::Error> {
        let client = self.client()?;
        let reply = tokio::time::timeout(timeout, client.request(subject.to_string(), payload))
            .await
            .map_err(|_| Error::Timeout)??;

        Ok(Message {
            subject: reply.subject.to_string(),
            reply: reply.reply.map(|reply| reply.to_string()),
            payload: reply.payload,
        })
    }

    async fn flush(&self) -> Result<(), Self::Error> {
        self.client()?.flush().await?;

        Ok(())
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let client = self.client.write().take();

        // The connection task exits once the last client handle is dropped.
        if let Some(client) = client {
            client.flush().await?;
            debug!("nats connection closed");
        }

        Ok(())
    }
}
