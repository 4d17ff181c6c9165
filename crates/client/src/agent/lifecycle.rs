//! Install and activate handlers.

use futures_util::future::{join_all, try_join_all};
use neu_core::{Bucket, Error, Request};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Agent;
use crate::fetch::resolve;

/// A manifest asset that could not be pre-cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssetFailure {
    pub asset: String,
    pub reason: String,
}

/// Result of the install handler.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub version: String,
    /// Manifest entries now stored in the bucket, in manifest order.
    pub cached: Vec<String>,
    /// Manifest entries that were skipped. Never fatal.
    pub failed: Vec<AssetFailure>,
    /// The host should activate this agent without a waiting phase.
    pub skip_waiting: bool,
}

/// Result of the activate handler.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateOutcome {
    pub version: String,
    /// Superseded buckets that were deleted.
    pub deleted: Vec<String>,
    /// Open clients are now controlled by this agent.
    pub clients_claimed: bool,
}

impl Agent {
    /// Open the current bucket and pre-cache the static manifest.
    ///
    /// Individual asset failures are logged and reported, never returned as
    /// errors: assets not deployed yet must not block installation. Only a
    /// failure to open the bucket itself fails install.
    pub async fn install(&self) -> Result<InstallOutcome, Error> {
        let bucket = Bucket::open(self.storage.clone(), self.config.cache_version.clone()).await?;
        tracing::info!(version = %bucket.name(), assets = self.config.static_assets.len(), "installing");

        let results = join_all(
            self.config
                .static_assets
                .iter()
                .map(|asset| self.precache(&bucket, asset)),
        )
        .await;

        let mut cached = Vec::new();
        let mut failed = Vec::new();
        for (asset, result) in self.config.static_assets.iter().zip(results) {
            match result {
                Ok(()) => cached.push(asset.clone()),
                Err(e) => {
                    tracing::warn!(%asset, error = %e, "skipping asset during install");
                    failed.push(AssetFailure { asset: asset.clone(), reason: e.to_string() });
                }
            }
        }

        tracing::info!(version = %bucket.name(), cached = cached.len(), failed = failed.len(), "installed");

        Ok(InstallOutcome { version: bucket.name().to_string(), cached, failed, skip_waiting: true })
    }

    async fn precache(&self, bucket: &Bucket, asset: &str) -> Result<(), Error> {
        let url = resolve(&self.config.origin, asset).map_err(|e| Error::InvalidUrl(format!("{asset}: {e}")))?;
        let request = Request::get(url);

        let response = self.network.fetch(&request).await?;
        if !response.is_success() {
            return Err(Error::HttpError(format!("status {}", response.status)));
        }

        bucket.put(&request, &response).await
    }

    /// Delete every bucket except the current one and claim open clients.
    ///
    /// Enumeration and deletion failures propagate; this activation cycle
    /// fails and the host reports it.
    pub async fn activate(&self) -> Result<ActivateOutcome, Error> {
        let version = self.config.cache_version.clone();
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != &version)
            .collect();

        let removed = try_join_all(stale.iter().map(|name| self.storage.delete(name))).await?;

        let deleted: Vec<String> = stale
            .into_iter()
            .zip(removed)
            .filter_map(|(name, removed)| removed.then_some(name))
            .collect();

        for name in &deleted {
            tracing::info!(bucket = %name, "deleted superseded bucket");
        }
        tracing::info!(%version, "activated; claiming clients");

        Ok(ActivateOutcome { version, deleted, clients_claimed: true })
    }
}
