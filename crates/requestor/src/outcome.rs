use bytes::Bytes;

/// The result of a single request, as seen by observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A reply arrived.
    Reply {
        /// Sequence number of the request.
        sequence: u64,

        /// The reply payload.
        payload: Bytes,
    },

    /// The request failed or timed out.
    Failed {
        /// Sequence number of the request.
        sequence: u64,

        /// Description of the failure.
        error: String,

        /// Whether the failure was a timeout.
        timed_out: bool,
    },
}

impl RequestOutcome {
    /// Sequence number of the request this outcome belongs to.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::Reply { sequence, .. } | Self::Failed { sequence, .. } => *sequence,
        }
    }

    /// Whether a reply arrived.
    #[must_use]
    pub const fn is_reply(&self) -> bool {
        matches!(self, Self::Reply { .. })
    }
}
