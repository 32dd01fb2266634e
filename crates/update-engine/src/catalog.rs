use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Result, UpdateError};
use crate::platform::{Arch, Os};
use crate::release::Asset;

/// Strongly-typed index key: one operating system, one architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformKey {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }
}

/// Immutable index pair produced by one catalog rebuild.
///
/// `latest` is derived from the sorted groups, so every `latest` key exists
/// in `assets` and its asset is the version-maximal member of that group.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    assets: HashMap<PlatformKey, Vec<Arc<Asset>>>,
    latest: HashMap<PlatformKey, Arc<Asset>>,
}

impl CatalogSnapshot {
    /// Group `assets` by platform, sort each group by ascending version,
    /// and record the per-platform maximum.
    pub fn build(assets: Vec<Asset>) -> Self {
        let mut grouped: HashMap<PlatformKey, Vec<Arc<Asset>>> = HashMap::new();
        for asset in assets {
            let key = PlatformKey::new(asset.os, asset.arch);
            grouped.entry(key).or_default().push(Arc::new(asset));
        }

        let mut latest = HashMap::new();
        for (key, group) in grouped.iter_mut() {
            group.sort_by(|a, b| a.version.cmp(&b.version));
            if let Some(newest) = group.last() {
                latest.insert(*key, Arc::clone(newest));
            }
        }

        Self {
            assets: grouped,
            latest,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Newest asset published for the platform.
    pub fn latest(&self, os: Os, arch: Arch) -> Result<Arc<Asset>> {
        self.latest
            .get(&PlatformKey::new(os, arch))
            .cloned()
            .ok_or(UpdateError::NotFound { os, arch })
    }

    /// Oldest asset published for the platform.
    pub fn oldest(&self, os: Os, arch: Arch) -> Result<Arc<Asset>> {
        self.assets
            .get(&PlatformKey::new(os, arch))
            .and_then(|group| group.first())
            .cloned()
            .ok_or(UpdateError::NotFound { os, arch })
    }

    /// Full version-ascending history for the platform; empty when the
    /// platform has no published assets.
    pub fn history(&self, os: Os, arch: Arch) -> &[Arc<Asset>] {
        self.assets
            .get(&PlatformKey::new(os, arch))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Platforms that currently have at least one published asset.
    pub fn platforms(&self) -> impl Iterator<Item = PlatformKey> + '_ {
        self.latest.keys().copied()
    }
}

/// Shared holder for the currently published snapshot.
///
/// Readers clone the inner `Arc` once and then run lock-free against a
/// consistent index pair; a rebuild publishes its finished snapshot with a
/// single swap, so no reader ever observes a half-old, half-new catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently published snapshot.
    pub fn load(&self) -> Arc<CatalogSnapshot> {
        self.current
            .read()
            .expect("catalog lock poisoned")
            .clone()
    }

    /// Swap in a fully built snapshot.
    pub fn publish(&self, snapshot: CatalogSnapshot) {
        *self.current.write().expect("catalog lock poisoned") = Arc::new(snapshot);
    }
}
