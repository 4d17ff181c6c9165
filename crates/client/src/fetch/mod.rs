//! Network capability consumed by the agent.
//!
//! ### Contract
//! - A response with any status is a successful fetch; callers decide what
//!   a non-2xx status means.
//! - Transport failures (offline, DNS, reset, timeout) are `Error::Network`.
//! - Bodies over `max_bytes` are rejected with `Error::FetchTooLarge`.
//!
//! ### Timeouts
//! The only deadline is the transport's own (`FetchConfig::timeout`).

pub mod url;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::{Client, header};

pub use self::url::{UrlError, canonicalize, resolve};

use neu_core::{Error, Request, Response};

/// Issue a request over the network.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "neu-cache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Transport timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "neu-cache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&neu_core::AppConfig> for FetchConfig {
    fn from(config: &neu_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed network.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn collect_headers(headers: &header::HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}

#[async_trait::async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{}: {e}", request.url)))?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                body.len(),
                self.config.max_bytes
            )));
        }

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response { url: Some(final_url), status: status.as_u16(), headers, body })
    }
}
