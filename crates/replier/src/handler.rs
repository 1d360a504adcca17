use std::time::Duration;

use async_trait::async_trait;
use demo_messaging::{Broker, Message, SubscriptionHandler, SubscriptionHandlerError};
use thiserror::Error;
use tracing::{info, warn};

/// Error returned when a reply could not be published.
#[derive(Debug, Error)]
#[error("failed to publish reply to {reply}: {source}")]
pub struct ReplyError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The reply address that was targeted.
    pub reply: String,

    /// The broker error.
    #[source]
    pub source: E,
}

impl<E> SubscriptionHandlerError for ReplyError<E> where E: std::error::Error + Send + Sync + 'static
{}

/// Answers every request with its own payload after a fixed delay.
#[derive(Clone, Debug)]
pub struct EchoHandler<B>
where
    B: Broker,
{
    broker: B,
    debug: bool,
    delay: Duration,
}

impl<B> EchoHandler<B>
where
    B: Broker,
{
    /// Creates a handler that replies through `broker`.
    pub const fn new(broker: B, delay: Duration, debug: bool) -> Self {
        Self {
            broker,
            debug,
            delay,
        }
    }
}

#[async_trait]
impl<B> SubscriptionHandler for EchoHandler<B>
where
    B: Broker,
{
    type Error = ReplyError<B::Error>;

    async fn handle(&self, message: Message) -> Result<(), Self::Error> {
        info!("Received: {}", String::from_utf8_lossy(&message.payload));

        tokio::time::sleep(self.delay).await;

        let Some(reply) = message.reply else {
            info!("no reply address on message from {}, skipping", message.subject);
            return Ok(());
        };

        if let Err(source) = self.broker.publish(&reply, message.payload).await {
            if self.debug {
                warn!("failed to reply to {}: {}", reply, source);
            }

            return Err(ReplyError { reply, source });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use demo_messaging::Subscriber;
    use demo_messaging_memory::MemoryBroker;
    use tokio::time::Instant;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_echoes_payload_to_reply_address() {
        let broker = MemoryBroker::new();
        let mut inbox = broker.subscribe("inbox.1").await.unwrap();
        let handler = EchoHandler::new(broker.clone(), Duration::from_millis(20), false);

        let start = Instant::now();
        handler
            .handle(Message::with_reply(
                "demo.requests",
                "inbox.1",
                Bytes::from_static(b"request-1"),
            ))
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(20));

        let reply = inbox.next().await.unwrap();
        assert_eq!(reply.payload, Bytes::from_static(b"request-1"));
    }

    #[tokio::test]
    async fn test_message_without_reply_is_skipped() {
        let broker = MemoryBroker::new();
        let handler = EchoHandler::new(broker, Duration::ZERO, false);

        let result = handler
            .handle(Message::new("demo.requests", Bytes::from_static(b"hi")))
            .await;

        assert!(result.is_ok());
    }

    async fn reply_through_closed_broker(debug: bool) -> ReplyError<demo_messaging_memory::Error> {
        let broker = MemoryBroker::new();
        let handler = EchoHandler::new(broker.clone(), Duration::ZERO, debug);
        broker.close().await.unwrap();

        handler
            .handle(Message::with_reply(
                "demo.requests",
                "inbox.3",
                Bytes::from_static(b"request-3"),
            ))
            .await
            .unwrap_err()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_reply_failure_logged_with_debug() {
        reply_through_closed_broker(true).await;

        assert!(logs_contain("failed to reply to inbox.3"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_reply_failure_silent_without_debug() {
        let error = reply_through_closed_broker(false).await;

        assert_eq!(error.reply, "inbox.3");
        assert!(!logs_contain("failed to reply"));
    }

    #[tokio::test]
    async fn test_publish_failure_is_reported() {
        let broker = MemoryBroker::new();
        let handler = EchoHandler::new(broker.clone(), Duration::ZERO, true);

        broker.close().await.unwrap();

        let error = handler
            .handle(Message::with_reply(
                "demo.requests",
                "inbox.2",
                Bytes::from_static(b"request-2"),
            ))
            .await
            .unwrap_err();

        assert_eq!(error.reply, "inbox.2");
    }
}
