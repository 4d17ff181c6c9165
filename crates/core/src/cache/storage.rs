//! The cache storage capability consumed by the agent.
//!
//! Storage is a set of named buckets, each mapping a request identity to a
//! response snapshot. Writes are whole-entry overwrites, so concurrent
//! writers to the same key resolve as last-write-wins without locking.

use std::fmt;
use std::sync::Arc;

use super::entries::StoredEntry;
use crate::Error;
use crate::http::{Request, Response};

/// Named-bucket cache storage.
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the bucket if it does not exist yet.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Whether a bucket with this name exists.
    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// All bucket names, in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a bucket and every entry in it. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Look up the stored response for a request identity.
    async fn match_request(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Store a response, overwriting any previous entry for the same identity.
    ///
    /// Fails with `Error::BucketMissing` if the bucket was never opened or
    /// has since been deleted.
    async fn put(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Remove one entry. Returns false if there was nothing to remove.
    async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error>;

    /// Every entry of a bucket, oldest first.
    async fn entries(&self, bucket: &str) -> Result<Vec<StoredEntry>, Error>;
}

/// Handle to one named bucket.
///
/// The handle carries its version tag explicitly; there is no ambient
/// "current cache". Cloning is cheap and shares the storage.
#[derive(Clone)]
pub struct Bucket {
    name: String,
    storage: Arc<dyn CacheStorage>,
}

impl Bucket {
    /// Open (create-if-absent) the bucket with the given name.
    pub async fn open(storage: Arc<dyn CacheStorage>, name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        storage.open(&name).await?;
        Ok(Self { name, storage })
    }

    /// Handle to a bucket by name without creating it.
    ///
    /// Reads through this handle see no entries if the bucket does not
    /// exist; writes fail with `Error::BucketMissing`.
    pub fn named(storage: Arc<dyn CacheStorage>, name: impl Into<String>) -> Self {
        Self { name: name.into(), storage }
    }

    /// Bucket name, i.e. the version tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.storage.match_request(&self.name, request).await
    }

    pub async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        self.storage.put(&self.name, request, response).await
    }

    pub async fn delete(&self, request: &Request) -> Result<bool, Error> {
        self.storage.delete_entry(&self.name, request).await
    }

    pub async fn entries(&self) -> Result<Vec<StoredEntry>, Error> {
        self.storage.entries(&self.name).await
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket").field("name", &self.name).finish_non_exhaustive()
    }
}
