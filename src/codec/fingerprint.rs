//! Version tokens for optimistic concurrency
//!
//! In identity mode the token depends on the NodeKey alone, so it changes
//! when a document's identity changes and never when its attributes do.
//! Content mode also digests the document body and changes on any edit.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::options::FingerprintMode;

#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    mode: FingerprintMode,
}

impl Fingerprinter {
    pub fn new(mode: FingerprintMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> FingerprintMode {
        self.mode
    }

    /// Token for the document saved under `key`
    pub fn generate(&self, key: &str, document: &Value) -> String {
        match self.mode {
            FingerprintMode::Identity => identity_fingerprint(key),
            FingerprintMode::Content => content_fingerprint(key, document),
        }
    }
}

/// Hex SHA-256 of the key
pub fn identity_fingerprint(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 of the key and the document's canonical JSON text.
///
/// Object keys serialize in sorted order, so attribute order in the input
/// does not affect the token.
pub fn content_fingerprint(key: &str, document: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update([0u8]);
    hasher.update(document.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}
