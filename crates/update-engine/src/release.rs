use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::{Arch, Os};
use crate::version::Version;

/// One downloadable artefact entry as reported by the release host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// File name; encodes the target platform per [`crate::platform::classify`].
    pub name: String,
    /// Download URL for the asset bytes.
    pub url: String,
}

/// A published release: a tagged bundle of per-platform assets.
///
/// Releases arrive as an immutable snapshot from the hosting collaborator;
/// the engine never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    /// Tag name carrying the semantic version for every asset in the bundle.
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Decode a JSON snapshot of releases produced by the hosting collaborator.
pub fn parse_release_list(bytes: &[u8]) -> Result<Vec<Release>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Fully indexed catalog entry for one platform build of one release.
///
/// Checksum and signature are computed once when the catalog is rebuilt and
/// are immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub os: Os,
    pub arch: Arch,
    pub version: Version,
    pub url: String,
    /// Lowercase hex SHA-256 of the asset bytes.
    pub checksum: String,
    /// Base64 Ed25519 signature over the asset bytes.
    pub signature: String,
}
