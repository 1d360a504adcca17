use crate::error::Error;

use std::collections::HashMap;

use demo_messaging::Message;
use demo_messaging::subject;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tracing::trace;

pub type SubscriptionId = u64;

#[derive(Debug)]
struct Registration {
    pattern: String,
    queue_group: Option<String>,
    sender: mpsc::UnboundedSender<Message>,
}

#[derive(Debug, Default)]
struct RouterState {
    closed: bool,
    next_id: SubscriptionId,
    registrations: HashMap<SubscriptionId, Registration>,
}

/// Subscription table shared by every handle to one in-memory broker.
#[derive(Debug, Default)]
pub struct Router {
    state: Mutex<RouterState>,
}

impl Router {
    pub fn register(
        &self,
        pattern: &str,
        queue_group: Option<&str>,
    ) -> Result<(SubscriptionId, mpsc::UnboundedReceiver<Message>), Error> {
        subject::validate_subject(pattern)?;

        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }

        state.next_id += 1;
        let id = state.next_id;
        let (sender, receiver) = mpsc::unbounded_channel();

        state.registrations.insert(
            id,
            Registration {
                pattern: pattern.to_string(),
                queue_group: queue_group.map(ToString::to_string),
                sender,
            },
        );

        Ok((id, receiver))
    }

    pub fn deregister(&self, id: SubscriptionId) {
        self.state.lock().registrations.remove(&id);
    }

    /// Delivers `message` to every matching plain subscriber and to one
    /// member of each matching queue group. Returns the number of deliveries.
    pub fn route(&self, message: &Message) -> Result<usize, Error> {
        subject::validate_publish_subject(&message.subject)?;

        let state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }

        let mut delivered = 0;
        let mut groups: HashMap<&str, Vec<&Registration>> = HashMap::new();

        for registration in state.registrations.values() {
            if registration.sender.is_closed()
                || !subject::matches(&registration.pattern, &message.subject)
            {
                continue;
            }

            match registration.queue_group.as_deref() {
                Some(group) => groups.entry(group).or_default().push(registration),
                None => {
                    if registration.sender.send(message.clone()).is_ok() {
                        delivered += 1;
                    }
                }
            }
        }

        let mut rng = rand::thread_rng();
        for members in groups.values() {
            if let Some(member) = members.choose(&mut rng) {
                if member.sender.send(message.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }

        trace!("routed message on {} to {} subscribers", message.subject, delivered);

        Ok(delivered)
    }

    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.registrations.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
