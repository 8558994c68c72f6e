//! Content hashing for cartridge images.

use sha2::{Digest, Sha256};

/// SHA-256 of `data` as 64 lowercase hex characters.
///
/// This is the digest stored under `information/sha256` in the release
/// database, so it is always computed over the whole buffer, copier header
/// included.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
