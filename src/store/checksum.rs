//! CRC32 checksum over the serialized key space
//!
//! Computed on every snapshot write and verified on every open.

use crc32fast::Hasher;

/// Computes the CRC32 (IEEE) checksum of `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Returns true when `data` hashes to `expected`.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}
