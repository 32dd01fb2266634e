use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::{Result, UpdateError};

/// Lowercase hex SHA-256 digest of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Signs asset bytes with the release key and verifies recorded signatures.
///
/// Ed25519 signing is deterministic, so identical bytes always produce the
/// identical signature string.
pub struct ReleaseSigner {
    signing_key: SigningKey,
}

impl ReleaseSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Key clients use to verify release signatures out of band.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Base64-encoded Ed25519 signature over `bytes`.
    pub fn sign(&self, bytes: &[u8]) -> String {
        let signature = self.signing_key.sign(bytes);
        general_purpose::STANDARD.encode(signature.to_bytes())
    }

    /// Check that `signature` is a valid release signature over `bytes`.
    pub fn verify(&self, bytes: &[u8], signature: &str) -> Result<()> {
        let raw = general_purpose::STANDARD
            .decode(signature.as_bytes())
            .map_err(|_| UpdateError::SignatureInvalid)?;
        let array: [u8; 64] = raw
            .try_into()
            .map_err(|_| UpdateError::SignatureInvalid)?;
        let parsed = Signature::from_bytes(&array);
        self.signing_key
            .verifying_key()
            .verify(bytes, &parsed)
            .map_err(|_| UpdateError::SignatureInvalid)
    }

    /// Resolution-time gate: `bytes` must match the checksum and signature
    /// recorded for the asset at catalog build time.
    pub fn verify_asset(
        &self,
        bytes: &[u8],
        expected_checksum: &str,
        expected_signature: &str,
    ) -> Result<()> {
        let actual = checksum(bytes);
        if actual != expected_checksum {
            return Err(UpdateError::VerificationFailed {
                expected: expected_checksum.to_string(),
                actual,
            });
        }
        self.verify(bytes, expected_signature)
    }
}
