//! Lifecycle interface shared by the long-running demo components.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::error::Error;

use async_trait::async_trait;

/// A component that is started once, runs in the background, and is shut
/// down exactly once.
///
/// Lifecycle: `Disconnected -> Connected & Active -> Draining/Closing ->
/// Terminated`. A component never moves back to active after `shutdown`.
#[async_trait]
pub trait Bootable
where
    Self: Send + Sync + 'static,
{
    /// The error type returned by lifecycle operations.
    type Error: Error + Send + Sync + 'static;

    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Start the component's background work.
    ///
    /// Returns an error if the component was already started or could not
    /// register with the broker.
    async fn start(&self) -> Result<(), Self::Error>;

    /// Stop the component and release its broker resources.
    async fn shutdown(&self) -> Result<(), Self::Error>;

    /// Wait until the component has terminated.
    async fn wait(&self);
}
