//! The fetch handler: per-request routing policy.
//!
//! Evaluation order:
//! 1. Non-GET requests pass through untouched.
//! 2. API requests pass through; the bucket is never consulted.
//! 3. Navigations are network-first, falling back to the cached entry page.
//! 4. Static assets are cache-first, populating the bucket on a successful miss.
//!
//! Cache reads that fail are treated as misses and cache writes run in the
//! background, so storage trouble never degrades the response path.

use neu_core::{Error, Request, Response};

use super::Agent;
use super::classify::{RequestClass, classify};
use crate::fetch::resolve;

/// Why a request was left to default network handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThroughReason {
    NonReadMethod,
    Api,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// The offline fallback document stood in for a failed navigation.
    Fallback,
    /// Not intercepted; fetched by the host.
    PassThrough,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::Fallback => "fallback",
            ResponseSource::PassThrough => "passthrough",
        }
    }
}

/// A response together with its provenance.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

/// Decision of the fetch handler.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted: the host performs the request as if no agent existed.
    PassThrough(PassThroughReason),
    /// The agent produced the response.
    Respond(Served),
}

impl Agent {
    /// Decide how to answer an intercepted request.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if !request.method.is_read() {
            tracing::debug!(method = %request.method, url = %request.url, "not intercepting non-GET request");
            return Ok(FetchOutcome::PassThrough(PassThroughReason::NonReadMethod));
        }

        match classify(request, &self.config.api_prefix) {
            RequestClass::Api => {
                tracing::debug!(url = %request.url, "API request bypasses cache");
                Ok(FetchOutcome::PassThrough(PassThroughReason::Api))
            }
            RequestClass::Navigation => self.network_first(request).await.map(FetchOutcome::Respond),
            RequestClass::StaticAsset => self.cache_first(request).await.map(FetchOutcome::Respond),
        }
    }

    /// Answer a request the way the host would: run the fetch handler and
    /// perform pass-through requests on the network.
    pub async fn respond(&self, request: &Request) -> Result<Served, Error> {
        match self.handle_fetch(request).await? {
            FetchOutcome::Respond(served) => Ok(served),
            FetchOutcome::PassThrough(_) => {
                let response = self.network.fetch(request).await?;
                Ok(Served { response, source: ResponseSource::PassThrough })
            }
        }
    }

    async fn network_first(&self, request: &Request) -> Result<Served, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response);
                Ok(Served { response, source: ResponseSource::Network })
            }
            Err(network_err) => {
                tracing::warn!(url = %request.url, error = %network_err, "navigation failed, serving offline fallback");

                let fallback = match resolve(&self.config.origin, &self.config.fallback_path) {
                    Ok(url) => Request::get(url),
                    Err(e) => {
                        tracing::warn!(path = %self.config.fallback_path, error = %e, "unusable fallback path");
                        return Err(network_err);
                    }
                };

                match self.lookup(&fallback).await {
                    Some(response) => Ok(Served { response, source: ResponseSource::Fallback }),
                    None => {
                        tracing::warn!(path = %self.config.fallback_path, "fallback document is not cached");
                        Err(network_err)
                    }
                }
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<Served, Error> {
        if let Some(response) = self.lookup(request).await {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(Served { response, source: ResponseSource::Cache });
        }

        tracing::debug!(url = %request.url, "cache miss");
        let response = self.network.fetch(request).await?;

        if response.is_success() {
            self.store_in_background(request, &response);
        } else {
            tracing::debug!(url = %request.url, status = response.status, "not caching unsuccessful response");
        }

        Ok(Served { response, source: ResponseSource::Network })
    }

    /// Read from the current bucket, treating storage errors as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.bucket().get(request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Hand an independent clone of `response` to the background writer.
    fn store_in_background(&self, request: &Request, response: &Response) {
        self.writer.store(
            self.storage.clone(),
            self.config.cache_version.clone(),
            request.clone(),
            response.clone(),
        );
    }
}
