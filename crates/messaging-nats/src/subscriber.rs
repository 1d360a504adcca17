use crate::error::Error;

use async_trait::async_trait;
use demo_messaging::{Message, Subscriber};
use futures::StreamExt;

/// A subscription registered with a NATS server.
#[derive(Debug)]
pub struct NatsSubscriber {
    inner: async_nats::Subscriber,
}

impl NatsSubscriber {
    pub(crate) const fn new(inner: async_nats::Subscriber) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Subscriber for NatsSubscriber {
    type Error = Error;

    async fn next(&mut self) -> Option<Message> {
        self.inner.next().await.map(|message| Message {
            subject: message.subject.to_string(),
            reply: message.reply.map(|reply| reply.to_string()),
            payload: message.payload,
        })
    }

    async fn unsubscribe(&mut self) -> Result<(), Self::Error> {
        self.inner.unsubscribe().await?;

        Ok(())
    }

    async fn drain(&mut self) -> Result<(), Self::Error> {
        self.inner.drain().await?;

        Ok(())
    }
}
