use bytes::Bytes;

/// A message as seen by a subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The subject the message was published to.
    pub subject: String,

    /// Broker-assigned address to send a response to, if the publisher
    /// expects one.
    pub reply: Option<String>,

    /// The opaque message body.
    pub payload: Bytes,
}

impl Message {
    /// Creates a message that expects no reply.
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            reply: None,
            payload: payload.into(),
        }
    }

    /// Creates a message that carries a reply address.
    pub fn with_reply(
        subject: impl Into<String>,
        reply: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            subject: subject.into(),
            reply: Some(reply.into()),
            payload: payload.into(),
        }
    }
}
