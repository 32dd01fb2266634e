use crate::platform::{Arch, Os};

/// Convenient result alias for engine operations.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur while building the catalog or resolving an update.
#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    /// The asset filename did not encode a known OS/architecture pair.
    #[error("unrecognized platform in asset name: {filename}")]
    UnrecognizedPlatform { filename: String },
    /// A version string failed to parse as a semantic version.
    #[error("invalid version: {0}")]
    InvalidVersion(#[from] semver::Error),
    /// No assets are published for the requested platform.
    #[error("no assets published for {os}/{arch}")]
    UnsupportedPlatform { os: Os, arch: Arch },
    /// A catalog lookup matched no asset.
    #[error("no asset found for {os}/{arch}")]
    NotFound { os: Os, arch: Arch },
    /// The patch envelope was malformed or built against different base bytes.
    #[error("corrupt patch: {0}")]
    CorruptPatch(&'static str),
    /// Reconstructed bytes did not match the recorded checksum.
    #[error("verification failed (expected {expected}, got {actual})")]
    VerificationFailed {
        /// Checksum recorded at catalog build time.
        expected: String,
        /// Checksum of the bytes under verification.
        actual: String,
    },
    /// The recorded signature did not verify against the bytes.
    #[error("asset signature invalid")]
    SignatureInvalid,
    /// A rebuild produced zero usable assets.
    #[error("release snapshot contained no usable assets")]
    NoUsableAssets,
    /// Network request for asset bytes failed.
    #[error("asset fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    /// The release list snapshot could not be decoded from JSON.
    #[error("release list decoding failed: {0}")]
    ReleaseDecode(#[from] serde_json::Error),
    /// Failed to encode or decode a patch body.
    #[error("patch I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl UpdateError {
    /// Helper for wrapping validation failures.
    pub fn validation(msg: impl Into<String>) -> Self {
        UpdateError::Other(msg.into())
    }
}
