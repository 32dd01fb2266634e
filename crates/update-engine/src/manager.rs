use std::collections::HashMap;

use bytes::Bytes;
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogSnapshot};
use crate::error::{Result, UpdateError};
use crate::fetcher::AssetFetcher;
use crate::integrity::{checksum, ReleaseSigner};
use crate::patch;
use crate::platform::{classify, Arch, Os};
use crate::release::{Asset, Release};
use crate::version::Version;

/// Client-supplied update-check parameters.
///
/// The checksum identifies which published build the client is running; it
/// is a lookup key for selecting a diff base, never proof of authenticity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    pub app_version: String,
    pub os: Os,
    pub arch: Arch,
    pub checksum: String,
}

/// Everything a client needs to move to the latest asset.
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    /// Version of the latest published asset.
    pub version: Version,
    /// Download URL of the full latest asset.
    pub url: String,
    /// Checksum recorded for the latest asset at catalog build time.
    pub checksum: String,
    /// Signature recorded for the latest asset at catalog build time.
    pub signature: String,
    /// Verified binary patch from the client's current asset to the latest
    /// one, when the client's checksum matched a known history entry.
    pub patch: Option<Bytes>,
}

/// Result of an update check.
#[derive(Debug, Clone)]
pub enum UpdateStatus {
    /// The client already runs the latest (or a newer) version.
    UpToDate,
    /// A newer version is available.
    Available(UpdateInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatchKey {
    from: String,
    to: String,
}

/// Maintains the published asset catalog and answers update checks.
///
/// Rebuilds are serialized through an async gate and publish a fully built
/// snapshot in one swap; update checks read the current snapshot lock-free
/// and may run fully in parallel.
pub struct ReleaseManager<F> {
    fetcher: F,
    signer: ReleaseSigner,
    catalog: Catalog,
    patches: Mutex<HashMap<PatchKey, Bytes>>,
    rebuild_gate: Mutex<()>,
}

impl<F> ReleaseManager<F>
where
    F: AssetFetcher,
{
    /// Create a manager with the given fetcher and release signing key.
    pub fn new(fetcher: F, signing_key: SigningKey) -> Self {
        Self {
            fetcher,
            signer: ReleaseSigner::new(signing_key),
            catalog: Catalog::new(),
            patches: Mutex::new(HashMap::new()),
            rebuild_gate: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn signer(&self) -> &ReleaseSigner {
        &self.signer
    }

    /// Rebuild the catalog from a snapshot of release metadata.
    ///
    /// Assets that fail to classify, belong to a release with an
    /// unparseable tag, or cannot be fetched are skipped. The rebuild
    /// fails only when nothing survives, and a failed rebuild leaves the
    /// previously published snapshot in effect.
    pub async fn rebuild(&self, releases: &[Release]) -> Result<()> {
        let _gate = self.rebuild_gate.lock().await;

        let mut assets = Vec::new();
        for release in releases {
            let version = match Version::parse(&release.tag) {
                Ok(version) => version,
                Err(err) => {
                    warn!("skipping release {} ({}): {}", release.id, release.tag, err);
                    continue;
                }
            };
            for entry in &release.assets {
                let info = match classify(&entry.name) {
                    Ok(info) => info,
                    Err(err) => {
                        warn!("skipping asset {}: {}", entry.name, err);
                        continue;
                    }
                };
                let bytes = match self.fetcher.fetch_bytes(&entry.url).await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!("skipping asset {}: {}", entry.name, err);
                        continue;
                    }
                };
                assets.push(Asset {
                    os: info.os,
                    arch: info.arch,
                    version: version.clone(),
                    url: entry.url.clone(),
                    checksum: checksum(&bytes),
                    signature: self.signer.sign(&bytes),
                });
            }
        }

        if assets.is_empty() {
            return Err(UpdateError::NoUsableAssets);
        }

        let snapshot = CatalogSnapshot::build(assets);
        debug!(
            "publishing rebuilt catalog for {} platform(s)",
            snapshot.platforms().count()
        );
        self.catalog.publish(snapshot);
        Ok(())
    }

    /// Answer a client's "is there an update for me?" query.
    pub async fn check_for_update(&self, params: &Params) -> Result<UpdateStatus> {
        let client_version = Version::parse(&params.app_version)?;
        let snapshot = self.catalog.load();

        let latest = snapshot
            .latest(params.os, params.arch)
            .map_err(|_| UpdateError::UnsupportedPlatform {
                os: params.os,
                arch: params.arch,
            })?;

        if client_version >= latest.version {
            return Ok(UpdateStatus::UpToDate);
        }

        let current = snapshot
            .history(params.os, params.arch)
            .iter()
            .find(|asset| asset.checksum == params.checksum)
            .cloned();

        let patch = match current {
            Some(current) => Some(self.patch_between(&current, &latest).await?),
            None => {
                debug!(
                    "client checksum unknown for {}/{}, falling back to full asset",
                    params.os, params.arch
                );
                None
            }
        };

        Ok(UpdateStatus::Available(UpdateInfo {
            version: latest.version.clone(),
            url: latest.url.clone(),
            checksum: latest.checksum.clone(),
            signature: latest.signature.clone(),
            patch,
        }))
    }

    /// Produce (or reuse) the verified patch that rewrites `from` into `to`.
    async fn patch_between(&self, from: &Asset, to: &Asset) -> Result<Bytes> {
        let key = PatchKey {
            from: from.checksum.clone(),
            to: to.checksum.clone(),
        };
        {
            let cache = self.patches.lock().await;
            if let Some(found) = cache.get(&key) {
                return Ok(found.clone());
            }
        }

        let old = self.fetcher.fetch_bytes(&from.url).await?;
        let new = self.fetcher.fetch_bytes(&to.url).await?;

        // Diffing and re-applying are CPU-bound; keep them off the async
        // workers.
        let (patch_bytes, reconstructed) =
            task::spawn_blocking(move || -> Result<(Vec<u8>, Vec<u8>)> {
                let patch_bytes = patch::diff(&old, &new)?;
                let reconstructed = patch::apply(&old, &patch_bytes)?;
                Ok((patch_bytes, reconstructed))
            })
            .await
            .map_err(|err| UpdateError::Other(format!("task join error: {err}")))??;

        // Never hand out a patch that does not reconstruct the recorded
        // latest bytes exactly.
        self.signer
            .verify_asset(&reconstructed, &to.checksum, &to.signature)?;

        let patch_bytes = Bytes::from(patch_bytes);
        self.patches.lock().await.insert(key, patch_bytes.clone());
        Ok(patch_bytes)
    }
}
