//! Stub collaborators for driving the agent in tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use neu_core::{AppConfig, CacheDb, CacheStorage, Error, Request, Response, StoredEntry};
use parking_lot::Mutex;

use super::sync::{DeferredTaskExecutor, SyncEvent};
use super::{Agent, AgentConfig};
use crate::fetch::Network;

enum Route {
    Respond(u16, String),
    Fail,
}

/// Network keyed by URL path. Unknown paths answer 404.
#[derive(Default)]
pub(crate) struct StubNetwork {
    routes: Mutex<HashMap<String, Route>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub fn serve(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .insert(path.to_string(), Route::Respond(status, body.to_string()));
    }

    pub fn fail(&self, path: &str) {
        self.routes.lock().insert(path.to_string(), Route::Fail);
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: offline", request.url)));
        }

        let routes = self.routes.lock();
        match routes.get(request.url.path()) {
            Some(Route::Respond(status, body)) => {
                let mut response = Response::new(*status, body.clone());
                response.url = Some(request.url.to_string());
                Ok(response)
            }
            Some(Route::Fail) => Err(Error::Network(format!("{}: connection reset", request.url))),
            None => Ok(Response::new(404, "")),
        }
    }
}

/// In-memory SQLite storage that counts calls and can be made to fail.
pub(crate) struct CountingStorage {
    inner: CacheDb,
    calls: AtomicUsize,
    broken: AtomicBool,
    read_only: AtomicBool,
}

impl CountingStorage {
    pub async fn new() -> Self {
        Self {
            inner: CacheDb::open_in_memory().await.unwrap(),
            calls: AtomicUsize::new(0),
            broken: AtomicBool::new(false),
            read_only: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every operation fails from now on.
    pub fn break_storage(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Bucket creation and puts fail from now on, e.g. quota exceeded.
    pub fn reject_writes(&self) {
        self.read_only.store(true, Ordering::SeqCst);
    }

    fn enter(&self, write: bool) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.load(Ordering::SeqCst) {
            return Err(Error::CorruptEntry("storage unavailable".into()));
        }
        if write && self.read_only.load(Ordering::SeqCst) {
            return Err(Error::CorruptEntry("quota exceeded".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheStorage for CountingStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.enter(true)?;
        self.inner.open(name).await
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.enter(false)?;
        self.inner.has(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.enter(false)?;
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.enter(false)?;
        self.inner.delete(name).await
    }

    async fn match_request(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.enter(false)?;
        self.inner.match_request(bucket, request).await
    }

    async fn put(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.enter(true)?;
        self.inner.put(bucket, request, response).await
    }

    async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error> {
        self.enter(false)?;
        self.inner.delete_entry(bucket, request).await
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<StoredEntry>, Error> {
        self.enter(false)?;
        self.inner.entries(bucket).await
    }
}

struct FailingExecutor;

#[async_trait::async_trait]
impl DeferredTaskExecutor for FailingExecutor {
    async fn run(&self, event: &SyncEvent) -> Result<(), Error> {
        Err(Error::SyncFailed(format!("{}: replay rejected", event.tag)))
    }
}

pub(crate) fn failing_executor() -> Arc<dyn DeferredTaskExecutor> {
    Arc::new(FailingExecutor)
}

/// An agent wired to stub collaborators.
pub(crate) struct Harness {
    pub agent: Agent,
    pub network: Arc<StubNetwork>,
    pub storage: Arc<CountingStorage>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_version("x-neu-v1").await
    }

    pub async fn with_version(version: &str) -> Self {
        let config = AgentConfig {
            cache_version: version.to_string(),
            ..AgentConfig::from_app_config(&AppConfig::default()).unwrap()
        };
        let network = Arc::new(StubNetwork::default());
        let storage = Arc::new(CountingStorage::new().await);
        let agent = Agent::new(config, storage.clone(), network.clone());
        Self { agent, network, storage }
    }

    /// GET request for a path on the agent's origin.
    pub fn get(&self, path: &str) -> Request {
        Request::get(self.agent.config().origin.join(path).unwrap())
    }
}
