//! Request and response snapshots exchanged between the agent, the network,
//! and cache storage.
//!
//! Header names are stored lowercased. Response bodies are `Bytes`, so a
//! clone is an independent handle onto the same immutable buffer: the copy
//! written to cache and the copy returned to the caller never share a cursor.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Other(String),
}

impl Method {
    /// Only GET requests are reads the agent will intercept.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Other(m) => m.as_str(),
        }
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: BTreeMap::new() }
    }

    /// Create a GET request for the given URL.
    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    /// Set a header, lowercasing its name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The Accept header, if the caller sent one.
    pub fn accept(&self) -> Option<&str> {
        self.header("accept")
    }
}

/// A response snapshot, either live from the network or read back from a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL the response was produced for, when known.
    pub url: Option<String>,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: None, status, headers: BTreeMap::new(), body: body.into() }
    }

    /// Set a header, lowercasing its name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// 2xx status, the same test as `Response.ok` in a browser.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
