//! Release catalog and binary patch engine for signed autoupdates.
//!
//! This crate is the core of an autoupdate distribution server. It takes a
//! snapshot of published releases (each holding per-platform binary
//! assets), classifies every asset by operating system and architecture
//! from its filename, and indexes the full version history plus the latest
//! build per platform. Against that catalog it answers client queries of
//! the form "I am running version V on platform P with checksum C" —
//! either with a compact, verified binary patch to the latest build or
//! with the full asset when the client's build is unknown. Checksums and
//! signatures are recorded once per asset when the catalog is rebuilt, and
//! every generated patch is re-applied and verified against them before it
//! leaves the engine.
//!
//! ```ignore
//! use ed25519_dalek::SigningKey;
//! use update_engine::{HttpAssetFetcher, Params, ReleaseManager, UpdateStatus};
//!
//! # async fn demo(releases: Vec<update_engine::Release>, key: SigningKey) -> update_engine::Result<()> {
//! let fetcher = HttpAssetFetcher::builder().build();
//! let manager = ReleaseManager::new(fetcher, key);
//! manager.rebuild(&releases).await?;
//!
//! let params: Params = serde_json::from_str(
//!     r#"{"app_version": "1.0.0", "os": "linux", "arch": "amd64", "checksum": "..."}"#,
//! )?;
//! match manager.check_for_update(&params).await? {
//!     UpdateStatus::Available(update) => {
//!         println!("update to {} available", update.version);
//!     }
//!     UpdateStatus::UpToDate => {
//!         println!("already at latest version");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod integrity;
pub mod manager;
pub mod patch;
pub mod platform;
pub mod release;
pub mod version;

pub use catalog::{Catalog, CatalogSnapshot, PlatformKey};
pub use error::{Result, UpdateError};
pub use fetcher::{AssetFetcher, HttpAssetFetcher, HttpAssetFetcherBuilder};
pub use integrity::{checksum, ReleaseSigner};
pub use manager::{Params, ReleaseManager, UpdateInfo, UpdateStatus};
pub use platform::{classify, Arch, AssetInfo, Os};
pub use release::{parse_release_list, Asset, Release, ReleaseAsset};
pub use version::Version;
