mod error;

pub use error::Error;

use crate::message::Message;
use crate::subscriber::Subscriber;
use crate::subscription_handler::SubscriptionHandler;

use std::fmt::{self, Debug};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// A live subscription that hands every delivered message to a handler.
///
/// Each delivery runs on its own task, so a slow handler does not hold up the
/// next message. [`Subscription::drain`] stops intake, handles whatever the
/// broker had already delivered, and then waits for every handler.
pub struct Subscription<S>
where
    S: Subscriber,
{
    dispatcher: Mutex<Option<JoinHandle<Result<(), S::Error>>>>,
    handler_tracker: TaskTracker,
    shutdown_token: CancellationToken,
}

impl<S> Subscription<S>
where
    S: Subscriber,
{
    /// Starts dispatching messages from `subscriber` to `handler`.
    pub fn new<X>(subscriber: S, handler: X) -> Self
    where
        X: SubscriptionHandler,
    {
        let shutdown_token = CancellationToken::new();
        let handler_tracker = TaskTracker::new();

        let dispatcher = tokio::spawn(Self::dispatch(
            subscriber,
            handler,
            shutdown_token.clone(),
            handler_tracker.clone(),
        ));

        Self {
            dispatcher: Mutex::new(Some(dispatcher)),
            handler_tracker,
            shutdown_token,
        }
    }

    async fn dispatch<X>(
        mut subscriber: S,
        handler: X,
        shutdown_token: CancellationToken,
        handler_tracker: TaskTracker,
    ) -> Result<(), S::Error>
    where
        X: SubscriptionHandler,
    {
        loop {
            tokio::select! {
                biased;
                () = shutdown_token.cancelled() => break,
                message = subscriber.next() => {
                    let Some(message) = message else {
                        debug!("subscriber closed by broker");
                        return Ok(());
                    };

                    Self::spawn_handler(&handler_tracker, &handler, message);
                }
            }
        }

        debug!("subscription draining, no longer accepting deliveries");

        // Messages already routed to this subscriber are still handled so a
        // queue group loses nothing when one member leaves.
        subscriber.drain().await?;

        while let Some(message) = subscriber.next().await {
            Self::spawn_handler(&handler_tracker, &handler, message);
        }

        Ok(())
    }

    fn spawn_handler<X>(handler_tracker: &TaskTracker, handler: &X, message: Message)
    where
        X: SubscriptionHandler,
    {
        let handler = handler.clone();
        handler_tracker.spawn(async move {
            let subject = message.subject.clone();
            if let Err(e) = handler.handle(message).await {
                debug!("handler failed for message on {}: {}", subject, e);
            }
        });
    }

    /// Number of handler invocations currently running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.handler_tracker.len()
    }

    /// Whether `drain` has been called.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Removes the subscription from the broker, dispatches every message
    /// the broker had already delivered, and waits for all handlers to
    /// finish. Calling `drain` again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher task failed or the broker rejected
    /// the unsubscribe. In-flight handlers are awaited in either case.
    pub async fn drain(&self) -> Result<(), Error<S::Error>> {
        self.shutdown_token.cancel();

        let dispatcher = self.dispatcher.lock().await.take();
        let result = match dispatcher {
            Some(handle) => match handle.await {
                Ok(unsubscribed) => unsubscribed.map_err(Error::Unsubscribe),
                Err(e) => Err(Error::Dispatcher(e)),
            },
            None => Ok(()),
        };

        if let Err(e) = &result {
            warn!("subscription did not drain cleanly: {}", e);
        }

        self.handler_tracker.close();
        self.handler_tracker.wait().await;

        result
    }
}

impl<S> Debug for Subscription<S>
where
    S: Subscriber,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("in_flight", &self.in_flight())
            .field("draining", &self.is_draining())
            .finish_non_exhaustive()
    }
}

impl<S> Drop for Subscription<S>
where
    S: Subscriber,
{
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}
