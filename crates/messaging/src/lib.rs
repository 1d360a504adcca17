//! Abstract interface for subject-based publish/subscribe messaging.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Brokers route published messages to matching subscribers.
pub mod broker;

/// Messages carry a payload and an optional reply address.
pub mod message;

/// Subjects are dot-separated routing keys.
pub mod subject;

/// Subscribers yield the messages delivered for a subscription.
pub mod subscriber;

/// Subscriptions dispatch delivered messages to a handler and support draining.
pub mod subscription;

/// Subscription handlers process delivered messages.
pub mod subscription_handler;

pub use broker::{Broker, BrokerError};
pub use message::Message;
pub use subscriber::{Subscriber, SubscriberError};
pub use subscription::Subscription;
pub use subscription_handler::{SubscriptionHandler, SubscriptionHandlerError};
