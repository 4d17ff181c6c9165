//! Bucket and entry operations on the SQLite store.
//!
//! Provides the `CacheStorage` implementation for `CacheDb`: creating and
//! deleting buckets, and reading, writing, and removing entries.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::hash::request_key;
use super::storage::CacheStorage;
use crate::Error;
use crate::http::{Request, Response};

/// A stored entry with its bucket metadata.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoredEntry {
    pub bucket: String,
    pub key: String,
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub final_url: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body_len: usize,
    pub stored_at: String,
}

fn decode_headers(json: &str) -> Result<BTreeMap<String, String>, Error> {
    Ok(serde_json::from_str(json)?)
}

#[async_trait::async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO buckets (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM buckets WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM buckets ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM buckets WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn match_request(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        let bucket = bucket.to_string();
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let row = conn.query_row(
                    "SELECT status_code, final_url, headers_json, body
                     FROM entries WHERE bucket = ?1 AND key = ?2",
                    params![bucket, key],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Vec<u8>>(3)?,
                        ))
                    },
                );

                match row {
                    Ok((status, url, headers_json, body)) => Ok(Some(Response {
                        url,
                        status,
                        headers: decode_headers(&headers_json)?,
                        body: Bytes::from(body),
                    })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let bucket = bucket.to_string();
        let key = request_key(request);
        let method = request.method.to_string();
        let mut url = request.url.clone();
        url.set_fragment(None);
        let url = url.to_string();
        let status = response.status;
        let final_url = response.url.clone();
        let headers_json = serde_json::to_string(&response.headers)?;
        let body = response.body.to_vec();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM buckets WHERE name = ?1)",
                    params![bucket],
                    |row| row.get(0),
                )?;
                if !exists {
                    return Err(Error::BucketMissing(bucket));
                }

                conn.execute(
                    "INSERT INTO entries (
                        bucket, key, method, url, status_code, final_url, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(bucket, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status_code = excluded.status_code,
                        final_url = excluded.final_url,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![bucket, key, method, url, status, final_url, headers_json, body, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error> {
        let bucket = bucket.to_string();
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM entries WHERE bucket = ?1 AND key = ?2",
                    params![bucket, key],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<StoredEntry>, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<StoredEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT bucket, key, method, url, status_code, final_url, headers_json,
                            length(body), stored_at
                     FROM entries WHERE bucket = ?1 ORDER BY stored_at ASC, rowid ASC",
                )?;
                let rows = stmt
                    .query_map(params![bucket], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, u16>(4)?,
                            row.get::<_, Option<String>>(5)?,
                            row.get::<_, String>(6)?,
                            row.get::<_, i64>(7)?,
                            row.get::<_, String>(8)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(bucket, key, method, url, status_code, final_url, headers_json, body_len, stored_at)| {
                        Ok(StoredEntry {
                            bucket,
                            key,
                            method,
                            url,
                            status_code,
                            final_url,
                            headers: decode_headers(&headers_json)?,
                            body_len: body_len as usize,
                            stored_at,
                        })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }
}
