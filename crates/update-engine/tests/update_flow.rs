//! End-to-end flow: rebuild a catalog from release metadata, then resolve
//! update checks and verify the returned patches client-side.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use ed25519_dalek::SigningKey;
use update_engine::{
    checksum, patch, Arch, AssetFetcher, Os, Params, Release, ReleaseAsset, ReleaseManager,
    UpdateError, UpdateStatus,
};

struct MockFetcher {
    entries: HashMap<String, Bytes>,
}

impl MockFetcher {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, url: &str, data: Vec<u8>) {
        self.entries.insert(url.to_string(), Bytes::from(data));
    }
}

#[async_trait]
impl AssetFetcher for MockFetcher {
    async fn fetch_bytes(&self, url: &str) -> update_engine::Result<Bytes> {
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| UpdateError::validation(format!("unknown url in mock fetcher: {url}")))
    }
}

fn binary(tag: &str, platform: &str) -> Vec<u8> {
    format!("application binary for {platform}, built from {tag}\n")
        .repeat(64)
        .into_bytes()
}

/// Two releases, each shipping a darwin/amd64 and a linux/arm asset.
fn fixture() -> (ReleaseManager<MockFetcher>, Vec<Release>) {
    let mut fetcher = MockFetcher::new();
    let mut releases = Vec::new();

    for (id, tag) in [(1u64, "v1.0.0"), (2, "v1.2.0")] {
        let mut assets = Vec::new();
        for platform in ["darwin-amd64", "linux-arm"] {
            let name = format!("autoupdate-binary-{platform}");
            let url = format!("https://releases.example/{tag}/{name}");
            fetcher.insert(&url, binary(tag, platform));
            assets.push(ReleaseAsset { name, url });
        }
        releases.push(Release {
            id,
            tag: tag.to_string(),
            assets,
        });
    }

    let manager = ReleaseManager::new(fetcher, SigningKey::from_bytes(&[42u8; 32]));
    (manager, releases)
}

#[tokio::test]
async fn oldest_client_gets_verified_patch_to_latest() -> Result<()> {
    let (manager, releases) = fixture();
    manager.rebuild(&releases).await?;

    let snapshot = manager.catalog().load();
    let platforms: Vec<_> = snapshot.platforms().collect();
    assert_eq!(platforms.len(), 2);

    for key in platforms {
        let oldest = snapshot.oldest(key.os, key.arch)?;
        let latest = snapshot.latest(key.os, key.arch)?;
        assert_ne!(oldest.checksum, latest.checksum);

        let params = Params {
            app_version: oldest.version.to_string(),
            os: key.os,
            arch: key.arch,
            checksum: oldest.checksum.clone(),
        };
        let update = match manager.check_for_update(&params).await? {
            UpdateStatus::Available(update) => update,
            UpdateStatus::UpToDate => panic!("expected an update for {}/{}", key.os, key.arch),
        };

        assert_eq!(update.version, latest.version);
        assert_eq!(update.checksum, latest.checksum);
        assert_eq!(update.signature, latest.signature);

        // Apply the patch the way a client would, then confirm the result
        // matches the checksum and signature the resolver reported.
        let patch_bytes = update.patch.expect("history match should yield a patch");
        let old_bytes = binary("v1.0.0", &format!("{}-{}", key.os, key.arch));
        let rebuilt = patch::apply(&old_bytes, &patch_bytes)?;

        assert_eq!(checksum(&rebuilt), latest.checksum);
        assert_ne!(checksum(&rebuilt), oldest.checksum);
        manager.signer().verify(&rebuilt, &latest.signature)?;
    }

    Ok(())
}

#[tokio::test]
async fn current_and_ahead_clients_are_up_to_date() -> Result<()> {
    let (manager, releases) = fixture();
    manager.rebuild(&releases).await?;

    let latest = manager.catalog().load().latest(Os::Darwin, Arch::X64)?;
    for app_version in [latest.version.to_string(), "9.9.9".to_string()] {
        let params = Params {
            app_version,
            os: Os::Darwin,
            arch: Arch::X64,
            checksum: latest.checksum.clone(),
        };
        assert!(matches!(
            manager.check_for_update(&params).await?,
            UpdateStatus::UpToDate
        ));
    }

    Ok(())
}

#[tokio::test]
async fn unknown_checksum_falls_back_to_full_asset() -> Result<()> {
    let (manager, releases) = fixture();
    manager.rebuild(&releases).await?;

    let latest = manager.catalog().load().latest(Os::Linux, Arch::Arm)?;
    let params = Params {
        app_version: "1.0.0".to_string(),
        os: Os::Linux,
        arch: Arch::Arm,
        checksum: "feedfacefeedface".to_string(),
    };
    let update = match manager.check_for_update(&params).await? {
        UpdateStatus::Available(update) => update,
        UpdateStatus::UpToDate => panic!("expected an update"),
    };

    assert!(update.patch.is_none());
    assert_eq!(update.url, latest.url);
    assert_eq!(update.checksum, latest.checksum);
    assert_eq!(update.signature, latest.signature);

    Ok(())
}

#[tokio::test]
async fn unsupported_platform_is_an_error() -> Result<()> {
    let (manager, releases) = fixture();
    manager.rebuild(&releases).await?;

    let params = Params {
        app_version: "1.0.0".to_string(),
        os: Os::Windows,
        arch: Arch::X86,
        checksum: "abc".to_string(),
    };
    assert!(matches!(
        manager.check_for_update(&params).await,
        Err(UpdateError::UnsupportedPlatform { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn malformed_client_version_is_an_error() -> Result<()> {
    let (manager, releases) = fixture();
    manager.rebuild(&releases).await?;

    let params = Params {
        app_version: "one point oh".to_string(),
        os: Os::Darwin,
        arch: Arch::X64,
        checksum: "abc".to_string(),
    };
    assert!(matches!(
        manager.check_for_update(&params).await,
        Err(UpdateError::InvalidVersion(_))
    ));

    Ok(())
}

#[tokio::test]
async fn rebuild_skips_bad_assets_but_keeps_good_ones() -> Result<()> {
    let (manager, mut releases) = fixture();

    // An unclassifiable name and a dead URL within an otherwise good
    // release must not sink the rebuild.
    releases[1].assets.push(ReleaseAsset {
        name: "autoupdate-binary-osx-386".to_string(),
        url: "https://releases.example/v1.2.0/autoupdate-binary-osx-386".to_string(),
    });
    releases[1].assets.push(ReleaseAsset {
        name: "autoupdate-binary-windows-386".to_string(),
        url: "https://releases.example/missing".to_string(),
    });

    manager.rebuild(&releases).await?;

    let snapshot = manager.catalog().load();
    assert_eq!(snapshot.platforms().count(), 2);
    assert!(snapshot.latest(Os::Windows, Arch::X86).is_err());

    Ok(())
}

#[tokio::test]
async fn failed_rebuild_keeps_previous_snapshot() -> Result<()> {
    let (manager, releases) = fixture();
    manager.rebuild(&releases).await?;

    let bad = vec![Release {
        id: 9,
        tag: "v2.0.0".to_string(),
        assets: vec![ReleaseAsset {
            name: "autoupdate-binary-osx-386".to_string(),
            url: "https://releases.example/v2.0.0/autoupdate-binary-osx-386".to_string(),
        }],
    }];
    assert!(matches!(
        manager.rebuild(&bad).await,
        Err(UpdateError::NoUsableAssets)
    ));

    // The catalog still serves the last good snapshot.
    let latest = manager.catalog().load().latest(Os::Darwin, Arch::X64)?;
    assert_eq!(latest.version.to_string(), "1.2.0");

    Ok(())
}

#[tokio::test]
async fn repeated_checks_reuse_the_cached_patch() -> Result<()> {
    let (manager, releases) = fixture();
    manager.rebuild(&releases).await?;

    let snapshot = manager.catalog().load();
    let oldest = snapshot.oldest(Os::Linux, Arch::Arm)?;
    let params = Params {
        app_version: oldest.version.to_string(),
        os: Os::Linux,
        arch: Arch::Arm,
        checksum: oldest.checksum.clone(),
    };

    let first = match manager.check_for_update(&params).await? {
        UpdateStatus::Available(update) => update.patch.expect("patch expected"),
        UpdateStatus::UpToDate => panic!("expected an update"),
    };
    let second = match manager.check_for_update(&params).await? {
        UpdateStatus::Available(update) => update.patch.expect("patch expected"),
        UpdateStatus::UpToDate => panic!("expected an update"),
    };

    assert_eq!(first, second);
    // Cache hits hand back the same shared buffer, not a recomputed copy.
    assert_eq!(first.as_ptr(), second.as_ptr());

    Ok(())
}
