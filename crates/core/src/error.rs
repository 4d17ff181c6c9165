//! Unified error types for neu-cache.
//!
//! Display strings carry a stable `CODE: detail` prefix so hosts can match on
//! the failure class without parsing the detail.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the cache agent and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The transport failed before a response was produced (offline, DNS, reset).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// The server answered, but with a non-success status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// No cache entry found for the given request.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// The named bucket does not exist (never opened, or purged by activation).
    #[error("BUCKET_MISSING: {0}")]
    BucketMissing(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored entry could not be encoded or decoded.
    #[error("CACHE_ERROR: corrupt entry: {0}")]
    CorruptEntry(String),

    /// A deferred task run on a sync signal failed.
    #[error("SYNC_FAILED: {0}")]
    SyncFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::CorruptEntry(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Network(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::BucketMissing(msg) => (-32004, msg.clone()),
            Error::SyncFailed(msg) => (-32005, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CorruptEntry(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
