//! In-memory implementation of the messaging crate.
//!
//! Routing follows the same rules as a NATS server: `*` and `>` wildcards,
//! fan-out to plain subscribers, one delivery per queue group, and request
//! replies through unique `_INBOX` subjects.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod router;
mod subscriber;

pub use error::Error;
pub use subscriber::MemorySubscriber;

use router::Router;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use demo_messaging::{Broker, Message, Subscriber};
use tracing::debug;
use uuid::Uuid;

/// Prefix for the reply subjects created by `request`.
pub const INBOX_PREFIX: &str = "_INBOX";

/// An in-process broker. Clones share the same subscription table.
#[derive(Clone, Debug, Default)]
pub struct MemoryBroker {
    router: Arc<Router>,
}

impl MemoryBroker {
    /// Creates a new, empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `close` has been called on any handle.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.router.is_closed()
    }

    fn register(
        &self,
        subject: &str,
        queue_group: Option<&str>,
    ) -> Result<MemorySubscriber, Error> {
        let (id, receiver) = self.router.register(subject, queue_group)?;

        Ok(MemorySubscriber::new(id, receiver, self.router.clone()))
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    type Error = Error;

    type SubscriberType = MemorySubscriber;

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), Self::Error> {
        self.router.route(&Message::new(subject, payload))?;

        Ok(())
    }

    async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), Self::Error> {
        self.router
            .route(&Message::with_reply(subject, reply, payload))?;

        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<Self::SubscriberType, Self::Error> {
        self.register(subject, None)
    }

    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Self::SubscriberType, Self::Error> {
        self.register(subject, Some(queue_group))
    }

    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Message, Self::Error> {
        let inbox = format!("{INBOX_PREFIX}.{}", Uuid::new_v4().simple());
        let mut replies = self.register(&inbox, None)?;

        self.publish_with_reply(subject, &inbox, payload).await?;

        match tokio::time::timeout(timeout, replies.next()).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(Error::Closed),
            Err(_) => {
                debug!("request on {} timed out after {:?}", subject, timeout);
                Err(Error::Timeout)
            }
        }
    }

    async fn flush(&self) -> Result<(), Self::Error> {
        if self.router.is_closed() {
            return Err(Error::Closed);
        }

        Ok(())
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.router.close();

        Ok(())
    }
}
