//! Core types and shared functionality for neu-cache.
//!
//! This crate provides:
//! - Request/response snapshots and request identity
//! - Versioned cache buckets with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{Bucket, CacheDb, CacheStorage, StoredEntry};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Method, Request, Response};
