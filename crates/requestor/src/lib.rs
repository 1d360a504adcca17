//! Load generator that sends sequenced requests and logs the replies.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod outcome;

pub use error::Error;
pub use outcome::RequestOutcome;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use demo_bootable::Bootable;
use demo_messaging::{Broker, BrokerError};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Default subject to send requests to.
pub const DEFAULT_SUBJECT: &str = "demo.requests";

/// Default number of concurrent request loops.
pub const DEFAULT_REQUESTORS: usize = 1;

/// How long each request waits for a reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between consecutive requests in one loop.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(25);

const OUTCOME_CAPACITY: usize = 1024;

/// Builds the payload for request number `sequence`.
#[must_use]
pub fn payload_for(sequence: u64) -> Bytes {
    Bytes::from(format!("request-{sequence}"))
}

/// Options for configuring a `Requestor`.
#[derive(Clone, Debug)]
pub struct RequestorOptions {
    /// Whether request errors are logged at warn level.
    pub debug: bool,

    /// Pause between consecutive requests in one loop.
    pub interval: Duration,

    /// Number of independent request loops. Zero is treated as one.
    pub requestors: usize,

    /// The subject to send requests to.
    pub subject: String,

    /// How long each request waits for a reply.
    pub timeout: Duration,
}

impl Default for RequestorOptions {
    fn default() -> Self {
        Self {
            debug: false,
            interval: DEFAULT_INTERVAL,
            requestors: DEFAULT_REQUESTORS,
            subject: DEFAULT_SUBJECT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
struct RequestSender<B>
where
    B: Broker,
{
    broker: B,
    debug: bool,
    outcomes: broadcast::Sender<RequestOutcome>,
    subject: String,
    timeout: Duration,
}

impl<B> RequestSender<B>
where
    B: Broker,
{
    async fn request(&self, sequence: u64) -> RequestOutcome {
        let outcome = match self
            .broker
            .request(&self.subject, payload_for(sequence), self.timeout)
            .await
        {
            Ok(reply) => {
                info!("{}", String::from_utf8_lossy(&reply.payload));

                RequestOutcome::Reply {
                    sequence,
                    payload: reply.payload,
                }
            }
            Err(e) => {
                if self.debug {
                    warn!("Request error: {}", e);
                } else {
                    debug!("Request error: {}", e);
                }

                RequestOutcome::Failed {
                    sequence,
                    error: e.to_string(),
                    timed_out: e.is_timeout(),
                }
            }
        };

        // Nobody listening is fine.
        let _ = self.outcomes.send(outcome.clone());

        outcome
    }

    async fn run(self, sequence: Arc<AtomicU64>, interval: Duration, token: CancellationToken) {
        while !token.is_cancelled() {
            let next = sequence.fetch_add(1, Ordering::SeqCst) + 1;

            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = self.request(next) => {}
            }

            tokio::select! {
                biased;
                () = token.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }

        debug!("request loop stopped");
    }
}

/// Sends a continuous stream of sequenced requests until shut down.
///
/// Every loop shares one counter, so sequence numbers are unique across
/// loops and increase within each loop. Shutdown abandons any request in
/// flight and closes the broker connection without draining.
pub struct Requestor<B>
where
    B: Broker,
{
    interval: Duration,
    requestors: usize,
    sender: RequestSender<B>,
    sequence: Arc<AtomicU64>,
    shutdown_token: CancellationToken,
    started: AtomicBool,
    task_tracker: TaskTracker,
}

impl<B> Requestor<B>
where
    B: Broker,
{
    /// Creates a new requestor. No requests are sent until `start`.
    pub fn new(broker: B, options: RequestorOptions) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CAPACITY);

        Self {
            interval: options.interval,
            requestors: options.requestors.max(1),
            sender: RequestSender {
                broker,
                debug: options.debug,
                outcomes,
                subject: options.subject,
                timeout: options.timeout,
            },
            sequence: Arc::new(AtomicU64::new(0)),
            shutdown_token: CancellationToken::new(),
            started: AtomicBool::new(false),
            task_tracker: TaskTracker::new(),
        }
    }

    /// Sends a single request with the given sequence number and reports what
    /// happened. Errors are logged and folded into the outcome.
    pub async fn request_once(&self, sequence: u64) -> RequestOutcome {
        self.sender.request(sequence).await
    }

    /// Subscribes to the outcomes of every request sent from now on.
    pub fn outcomes(&self) -> broadcast::Receiver<RequestOutcome> {
        self.sender.outcomes.subscribe()
    }

    /// The highest sequence number handed out so far.
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<B> Bootable for Requestor<B>
where
    B: Broker,
{
    type Error = Error<B::Error>;

    fn name(&self) -> &str {
        "requestor"
    }

    async fn start(&self) -> Result<(), Self::Error> {
        if self.started.swap(true, Ordering::SeqCst) || self.shutdown_token.is_cancelled() {
            return Err(Error::AlreadyStarted);
        }

        for _ in 0..self.requestors {
            self.task_tracker.spawn(self.sender.clone().run(
                self.sequence.clone(),
                self.interval,
                self.shutdown_token.clone(),
            ));
        }

        info!(
            "started {} request loop(s) on [{}]",
            self.requestors, self.sender.subject
        );

        Ok(())
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.shutdown_token.cancel();

        self.task_tracker.close();
        self.task_tracker.wait().await;

        self.sender.broker.close().await.map_err(Error::Close)?;

        info!("Exiting...");

        Ok(())
    }

    async fn wait(&self) {
        self.shutdown_token.cancelled().await;
        self.task_tracker.wait().await;
    }
}
