//! The output contract between the ingestion pipeline and a sink.
//!
//! The pipeline hands batches to an [`Outputer`] together with a
//! [`Signaler`] and [`PublishOptions`]. Every publish call reports its outcome
//! twice: through the returned `Result` and through the signaler, so callers
//! that track delivery out of band can keep doing so.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{PublishError, PublishResult};
use crate::event::Event;

// =============================================================================
// Publish Options
// =============================================================================

/// Per-call publish options.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// The caller requires at-least-once delivery. Only changes how loudly a
    /// failure is logged.
    pub guaranteed: bool,
    /// Deadline for the whole HTTP round trip of this call.
    pub timeout: Option<Duration>,
    /// Aborts the call when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl PublishOptions {
    /// Best-effort options with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the call as guaranteed delivery.
    pub fn guaranteed(mut self) -> Self {
        self.guaranteed = true;
        self
    }

    /// Sets a per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

// =============================================================================
// Signalers
// =============================================================================

/// Completion handle supplied by the caller of a publish operation.
pub trait Signaler: Send + Sync {
    /// The batch was delivered.
    fn completed(&self);

    /// The batch was not delivered.
    fn failed(&self, error: &PublishError);
}

/// A signaler that ignores every outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSignaler;

impl Signaler for NoopSignaler {
    fn completed(&self) {}

    fn failed(&self, _error: &PublishError) {}
}

/// Outcome delivered by a [`ChannelSignaler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The batch was delivered.
    Completed,
    /// The batch was dropped with this error.
    Failed(PublishError),
}

/// A signaler that forwards the first outcome over a oneshot channel.
///
/// Later outcomes are dropped.
#[derive(Debug)]
pub struct ChannelSignaler {
    tx: Mutex<Option<oneshot::Sender<SignalOutcome>>>,
}

impl ChannelSignaler {
    /// Creates a signaler and the receiver for its outcome.
    pub fn new() -> (Self, oneshot::Receiver<SignalOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    fn deliver(&self, outcome: SignalOutcome) {
        match self.tx.lock().take() {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    trace!("Signal receiver dropped");
                }
            }
            None => trace!("Signal already delivered, ignoring"),
        }
    }
}

impl Signaler for ChannelSignaler {
    fn completed(&self) {
        self.deliver(SignalOutcome::Completed);
    }

    fn failed(&self, error: &PublishError) {
        self.deliver(SignalOutcome::Failed(error.clone()));
    }
}

// =============================================================================
// Outputer
// =============================================================================

/// A sink that publishes event batches.
#[async_trait]
pub trait Outputer: Send + Sync {
    /// Publishes a single event as a batch of one.
    async fn publish_event(
        &self,
        signaler: &dyn Signaler,
        opts: &PublishOptions,
        event: Event,
    ) -> PublishResult<()> {
        self.publish_events(signaler, opts, vec![event]).await
    }

    /// Publishes a batch of events in one request.
    async fn publish_events(
        &self,
        signaler: &dyn Signaler,
        opts: &PublishOptions,
        events: Vec<Event>,
    ) -> PublishResult<()>;
}

/// A shared, type-erased output.
pub type BoxedOutputer = Arc<dyn Outputer>;
