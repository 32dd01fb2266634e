use sha2::{Digest, Sha256};

use crate::error::{Result, UpdateError};

// Envelope layout: magic, old length, new length, SHA-256 of the old
// bytes, then the raw bsdiff body.
const MAGIC: &[u8; 8] = b"UEPATCH1";
const HEADER_LEN: usize = 8 + 8 + 8 + 32;

/// Compute a self-describing binary patch that rewrites `old` into `new`.
///
/// The envelope records both stream lengths and a digest of `old` so that
/// [`apply`] can reject a patch fed the wrong base bytes. Output is
/// deterministic: identical inputs always yield byte-identical patches.
pub fn diff(old: &[u8], new: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + new.len() / 2);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(old.len() as u64).to_le_bytes());
    out.extend_from_slice(&(new.len() as u64).to_le_bytes());
    out.extend_from_slice(&Sha256::digest(old));
    bsdiff::diff(old, new, &mut out)?;
    Ok(out)
}

/// Reconstruct the new byte stream from `old` plus a patch from [`diff`].
///
/// Fails with [`UpdateError::CorruptPatch`] when the envelope is malformed
/// or the patch was produced against a different `old`.
pub fn apply(old: &[u8], patch: &[u8]) -> Result<Vec<u8>> {
    if patch.len() < HEADER_LEN || &patch[..8] != MAGIC {
        return Err(UpdateError::CorruptPatch("bad envelope header"));
    }

    if read_u64(&patch[8..16]) != old.len() as u64 {
        return Err(UpdateError::CorruptPatch("base length mismatch"));
    }
    if &patch[24..56] != Sha256::digest(old).as_slice() {
        return Err(UpdateError::CorruptPatch(
            "patch was built against different base bytes",
        ));
    }

    // The length field is untrusted until the body decodes; clamp the
    // preallocation.
    let new_len = read_u64(&patch[16..24]) as usize;
    let mut new = Vec::with_capacity(new_len.min(1 << 26));
    let mut body = &patch[HEADER_LEN..];
    bsdiff::patch(old, &mut body, &mut new)
        .map_err(|_| UpdateError::CorruptPatch("undecodable patch body"))?;

    if new.len() != new_len {
        return Err(UpdateError::CorruptPatch("reconstructed length mismatch"));
    }
    Ok(new)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
