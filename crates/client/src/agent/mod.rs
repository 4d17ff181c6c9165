//! The resource cache agent.
//!
//! The agent sits between an application's requests and the network. It
//! owns one versioned bucket, named by `AgentConfig::cache_version`, and
//! reacts to four lifecycle events:
//!
//! - `install`: open the bucket and pre-cache the static manifest, best-effort
//! - `activate`: delete every bucket but the current one, claim clients
//! - `fetch`: route by request class (pass-through, network-first, cache-first)
//! - `sync`: acknowledge background sync signals via a deferred task executor
//!
//! Events go through [`Agent::dispatch`], so a host harness (or a test) can
//! drive the agent with synthetic requests and stub collaborators.

pub mod background;
pub mod classify;
pub mod lifecycle;
pub mod routing;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use neu_core::{AppConfig, Bucket, CacheStorage, Error, Request};
use url::Url;

use crate::fetch::Network;

pub use background::BackgroundWriter;
pub use classify::{RequestClass, classify};
pub use lifecycle::{ActivateOutcome, AssetFailure, InstallOutcome};
pub use routing::{FetchOutcome, PassThroughReason, ResponseSource, Served};
pub use sync::{AcknowledgingExecutor, DeferredTaskExecutor, SyncEvent, SyncOutcome};

/// Agent settings, resolved from `AppConfig`.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub cache_version: String,
    pub origin: Url,
    pub static_assets: Vec<String>,
    pub api_prefix: String,
    pub fallback_path: String,
    pub sync_tags: Vec<String>,
}

impl AgentConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config
            .origin_url()
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            cache_version: config.cache_version.clone(),
            origin,
            static_assets: config.static_assets.clone(),
            api_prefix: config.api_prefix.clone(),
            fallback_path: config.fallback_path.clone(),
            sync_tags: config.sync_tags.clone(),
        })
    }
}

/// Lifecycle event kinds the agent registers a handler for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Sync,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Sync => "sync",
        }
    }
}

/// A lifecycle event dispatched by the host.
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Sync(SyncEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Sync(_) => EventKind::Sync,
        }
    }
}

/// What a handler produced for its event.
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallOutcome),
    Activated(ActivateOutcome),
    Fetched(FetchOutcome),
    Synced(SyncOutcome),
}

/// The resource cache agent.
pub struct Agent {
    config: AgentConfig,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    executor: Arc<dyn DeferredTaskExecutor>,
    writer: BackgroundWriter,
}

impl Agent {
    /// Events this agent handles, one handler each.
    pub const HANDLED_EVENTS: [EventKind; 4] = [EventKind::Install, EventKind::Activate, EventKind::Fetch, EventKind::Sync];

    pub fn new(config: AgentConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Self {
        Self { config, storage, network, executor: Arc::new(AcknowledgingExecutor), writer: BackgroundWriter::new() }
    }

    /// Replace the deferred task executor used for sync signals.
    pub fn with_executor(mut self, executor: Arc<dyn DeferredTaskExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Version tag of the current bucket.
    pub fn version(&self) -> &str {
        &self.config.cache_version
    }

    /// Handle to the current bucket; does not create it.
    pub fn bucket(&self) -> Bucket {
        Bucket::named(self.storage.clone(), self.config.cache_version.clone())
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Route one event to its handler.
    pub async fn dispatch(&self, event: Event) -> Result<EventOutcome, Error> {
        tracing::debug!(event = event.kind().as_str(), version = %self.config.cache_version, "dispatch");
        match event {
            Event::Install => self.install().await.map(EventOutcome::Installed),
            Event::Activate => self.activate().await.map(EventOutcome::Activated),
            Event::Fetch(request) => self.handle_fetch(&request).await.map(EventOutcome::Fetched),
            Event::Sync(sync) => self.handle_sync(&sync).await.map(EventOutcome::Synced),
        }
    }

    /// Handle a background sync signal.
    ///
    /// Registered tags run through the deferred task executor; any other tag
    /// resolves as ignored.
    pub async fn handle_sync(&self, event: &SyncEvent) -> Result<SyncOutcome, Error> {
        if !self.config.sync_tags.iter().any(|t| t == &event.tag) {
            tracing::debug!(tag = %event.tag, "no deferred task for sync tag");
            return Ok(SyncOutcome::Ignored { tag: event.tag.clone() });
        }

        self.executor.run(event).await?;
        Ok(SyncOutcome::Completed { tag: event.tag.clone() })
    }

    /// Wait for all background cache writes spawned so far.
    pub async fn settle(&self) {
        self.writer.settle().await;
    }

    /// Number of background cache writes still running.
    pub fn pending_writes(&self) -> usize {
        self.writer.pending()
    }
}
