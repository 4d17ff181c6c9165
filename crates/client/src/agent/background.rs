//! Detached cache writes.
//!
//! A write is spawned onto the runtime and never awaited by the request that
//! produced it. Failures are logged and dropped here; they never reach the
//! caller. Dropping the spawning future does not cancel the write.

use std::sync::Arc;

use neu_core::{Bucket, CacheStorage, Request, Response};
use parking_lot::Mutex;
use tokio::task::JoinSet;

/// Spawns and tracks fire-and-forget bucket writes.
#[derive(Clone, Default)]
pub struct BackgroundWriter {
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `response` under `request` in the named bucket, in the background.
    ///
    /// The bucket is never created here. A write whose bucket was deleted in
    /// the meantime fails with `Error::BucketMissing` and is dropped, so a
    /// superseded version cannot come back.
    pub fn store(&self, storage: Arc<dyn CacheStorage>, bucket: String, request: Request, response: Response) {
        let mut pending = self.pending.lock();
        while pending.try_join_next().is_some() {}

        pending.spawn(async move {
            let bucket = Bucket::named(storage, bucket);
            match bucket.put(&request, &response).await {
                Ok(()) => tracing::debug!(url = %request.url, status = response.status, "cached response"),
                Err(e) => {
                    tracing::warn!(url = %request.url, bucket = %bucket.name(), error = %e, "background cache write failed")
                }
            }
        });
    }

    /// Number of writes that have not finished yet.
    pub fn pending(&self) -> usize {
        let mut pending = self.pending.lock();
        while pending.try_join_next().is_some() {}
        pending.len()
    }

    /// Wait for every write spawned so far.
    pub async fn settle(&self) {
        let mut writes = std::mem::take(&mut *self.pending.lock());
        while let Some(result) = writes.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "background cache write aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neu_core::CacheDb;
    use url::Url;

    fn request(path: &str) -> Request {
        Request::get(Url::parse("http://localhost:8080").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn test_store_then_settle() {
        let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.unwrap());
        storage.open("x-neu-v1").await.unwrap();
        let writer = BackgroundWriter::new();

        writer.store(storage.clone(), "x-neu-v1".into(), request("/a.js"), Response::new(200, "a"));
        writer.store(storage.clone(), "x-neu-v1".into(), request("/b.js"), Response::new(200, "b"));
        writer.settle().await;

        assert_eq!(writer.pending(), 0);
        let bucket = Bucket::named(storage, "x-neu-v1");
        assert_eq!(bucket.entries().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_settle_with_nothing_pending() {
        let writer = BackgroundWriter::new();
        writer.settle().await;
        assert_eq!(writer.pending(), 0);
    }

    #[tokio::test]
    async fn test_write_survives_dropped_caller() {
        let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.unwrap());
        storage.open("x-neu-v1").await.unwrap();
        let writer = BackgroundWriter::new();

        {
            let writer = writer.clone();
            let storage = storage.clone();
            let caller = async move {
                writer.store(storage, "x-neu-v1".into(), request("/late.css"), Response::new(200, "late"));
                std::future::pending::<()>().await;
            };
            let _ = tokio::time::timeout(std::time::Duration::from_millis(10), caller).await;
        }

        writer.settle().await;
        let hit = Bucket::named(storage, "x-neu-v1").get(&request("/late.css")).await.unwrap();
        assert_eq!(hit.map(|r| r.text()), Some("late".to_string()));
    }

    #[tokio::test]
    async fn test_write_to_deleted_bucket_is_dropped() {
        let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.unwrap());
        storage.open("x-neu-v1").await.unwrap();
        storage.delete("x-neu-v1").await.unwrap();
        let writer = BackgroundWriter::new();

        writer.store(storage.clone(), "x-neu-v1".into(), request("/app.js"), Response::new(200, "js"));
        writer.settle().await;

        assert!(storage.keys().await.unwrap().is_empty());
        assert_eq!(writer.pending(), 0);
    }
}
