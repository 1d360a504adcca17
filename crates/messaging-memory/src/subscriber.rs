use crate::error::Error;
use crate::router::{Router, SubscriptionId};

use std::sync::Arc;

use async_trait::async_trait;
use demo_messaging::{Message, Subscriber};
use tokio::sync::mpsc;

/// The receiving end of an in-memory subscription.
///
/// Dropping the subscriber removes it from the broker.
#[derive(Debug)]
pub struct MemorySubscriber {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Message>,
    router: Arc<Router>,
}

impl MemorySubscriber {
    pub(crate) const fn new(
        id: SubscriptionId,
        receiver: mpsc::UnboundedReceiver<Message>,
        router: Arc<Router>,
    ) -> Self {
        Self {
            id,
            receiver,
            router,
        }
    }
}

#[async_trait]
impl Subscriber for MemorySubscriber {
    type Error = Error;

    async fn next(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    async fn unsubscribe(&mut self) -> Result<(), Self::Error> {
        self.router.deregister(self.id);
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}

        Ok(())
    }

    async fn drain(&mut self) -> Result<(), Self::Error> {
        // Once deregistered the router holds no sender, so `next` ends after
        // the buffered messages.
        self.router.deregister(self.id);
        self.receiver.close();

        Ok(())
    }
}

impl Drop for MemorySubscriber {
    fn drop(&mut self) {
        self.router.deregister(self.id);
    }
}
