//! Queue-group replier that echoes every request back to its sender.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod handler;

pub use error::Error;
pub use handler::{EchoHandler, ReplyError};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use demo_bootable::Bootable;
use demo_messaging::{Broker, Subscriber, Subscription};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default subject to listen on.
pub const DEFAULT_SUBJECT: &str = "demo.requests";

/// Default queue group to join.
pub const DEFAULT_QUEUE_GROUP: &str = "demo";

/// Default delay before each reply.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Error type of a replier running on broker `B`.
pub type ReplierError<B> =
    Error<<B as Broker>::Error, <<B as Broker>::SubscriberType as Subscriber>::Error>;

/// Options for configuring a `Replier`.
#[derive(Clone, Debug)]
pub struct ReplierOptions {
    /// Whether failed replies are logged.
    pub debug: bool,

    /// How long to wait before replying to each message.
    pub delay: Duration,

    /// The queue group to join.
    pub queue_group: String,

    /// The subject to listen on.
    pub subject: String,
}

impl Default for ReplierOptions {
    fn default() -> Self {
        Self {
            debug: false,
            delay: DEFAULT_DELAY,
            queue_group: DEFAULT_QUEUE_GROUP.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// Joins a queue group and echoes each request after the configured delay.
///
/// Shutdown drains: intake stops, in-flight handlers finish, and outstanding
/// replies are flushed before [`Bootable::wait`] returns.
pub struct Replier<B>
where
    B: Broker,
{
    broker: B,
    options: ReplierOptions,
    shutdown_token: CancellationToken,
    started: AtomicBool,
    subscription: Mutex<Option<Arc<Subscription<B::SubscriberType>>>>,
    terminated_token: CancellationToken,
}

impl<B> Replier<B>
where
    B: Broker,
{
    /// Creates a new replier. Nothing is subscribed until `start`.
    pub fn new(broker: B, options: ReplierOptions) -> Self {
        Self {
            broker,
            options,
            shutdown_token: CancellationToken::new(),
            started: AtomicBool::new(false),
            subscription: Mutex::new(None),
            terminated_token: CancellationToken::new(),
        }
    }

    /// The options the replier was created with.
    pub const fn options(&self) -> &ReplierOptions {
        &self.options
    }

    /// Number of requests currently being handled.
    pub fn in_flight(&self) -> usize {
        self.subscription
            .lock()
            .as_ref()
            .map_or(0, |subscription| subscription.in_flight())
    }

    async fn drain(&self) -> Result<(), ReplierError<B>> {
        let subscription = self.subscription.lock().clone();

        if let Some(subscription) = subscription {
            info!("Draining...");

            let drained = subscription.drain().await.map_err(Error::Drain);
            self.subscription.lock().take();
            drained?;

            self.broker.flush().await.map_err(Error::Flush)?;

            info!("Exiting.");
        }

        Ok(())
    }
}

#[async_trait]
impl<B> Bootable for Replier<B>
where
    B: Broker,
{
    type Error = ReplierError<B>;

    fn name(&self) -> &str {
        "replier"
    }

    async fn start(&self) -> Result<(), Self::Error> {
        if self.started.swap(true, Ordering::SeqCst) || self.shutdown_token.is_cancelled() {
            return Err(Error::AlreadyStarted);
        }

        let subscriber = self
            .broker
            .queue_subscribe(&self.options.subject, &self.options.queue_group)
            .await
            .map_err(Error::Subscribe)?;

        let handler = EchoHandler::new(
            self.broker.clone(),
            self.options.delay,
            self.options.debug,
        );

        // Shutdown cancels the token before it looks for a subscription, so
        // checking under the lock means a subscription is never left behind.
        let mut abandoned = {
            let mut subscription = self.subscription.lock();
            if self.shutdown_token.is_cancelled() {
                Some(subscriber)
            } else {
                subscription.replace(Arc::new(Subscription::new(subscriber, handler)));
                None
            }
        };

        if let Some(subscriber) = abandoned.as_mut() {
            if let Err(e) = subscriber.unsubscribe().await {
                warn!("failed to unsubscribe after early shutdown: {}", e);
            }
            return Err(Error::AlreadyStarted);
        }

        info!(
            "Listening on [{}] in queue group [{}]",
            self.options.subject, self.options.queue_group
        );

        Ok(())
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.shutdown_token.cancel();

        let result = self.drain().await;

        self.terminated_token.cancel();

        result
    }

    async fn wait(&self) {
        self.terminated_token.cancelled().await;
    }
}
