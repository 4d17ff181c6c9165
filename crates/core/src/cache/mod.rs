//! Versioned cache buckets backed by SQLite.
//!
//! This module provides the storage side of the agent:
//!
//! - `CacheStorage`: the storage capability the agent consumes
//! - `Bucket`: a handle naming one versioned bucket
//! - `CacheDb`: the SQLite implementation (WAL mode, versioned migrations)
//! - Request identity hashing for entry keys

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredEntry;
pub use storage::{Bucket, CacheStorage};
