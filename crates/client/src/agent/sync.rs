//! Background sync signals and the deferred task seam.
//!
//! The agent only acknowledges sync signals. Replaying work queued while
//! offline belongs to a `DeferredTaskExecutor` supplied by the host.

use neu_core::Error;

/// A background sync signal from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub tag: String,
    /// The host will not retry this tag after this attempt.
    pub last_chance: bool,
}

impl SyncEvent {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), last_chance: false }
    }
}

/// Result of handling a sync signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The tag is registered and its deferred task resolved.
    Completed { tag: String },
    /// No deferred task is registered for the tag.
    Ignored { tag: String },
}

/// Runs the deferred work registered for a sync tag.
#[async_trait::async_trait]
pub trait DeferredTaskExecutor: Send + Sync {
    async fn run(&self, event: &SyncEvent) -> Result<(), Error>;
}

/// Executor that acknowledges every signal without doing any work.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgingExecutor;

#[async_trait::async_trait]
impl DeferredTaskExecutor for AcknowledgingExecutor {
    async fn run(&self, event: &SyncEvent) -> Result<(), Error> {
        tracing::info!(tag = %event.tag, last_chance = event.last_chance, "sync acknowledged");
        Ok(())
    }
}
