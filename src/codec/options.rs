//! Codec behaviour switches
//!
//! Defaults reproduce the stored layout and output shape older deployments
//! already rely on: identity-derived fingerprints and multi-member edges
//! bound under their full edge-set key.

use serde::{Deserialize, Serialize};

/// Default cap on document nesting, counted in objects from the root
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What the version token is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintMode {
    /// Digest of the root NodeKey only. Stable across content changes.
    #[default]
    Identity,
    /// Digest of the root NodeKey and the canonical document body
    Content,
}

/// Output key used for edge sets decoded as arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayKeyNaming {
    /// The full edge-set key, e.g. `plan_abc_members`
    #[default]
    EdgeKey,
    /// The bare attribute name, e.g. `members`
    Attribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    pub max_depth: usize,
    pub fingerprint_mode: FingerprintMode,
    pub array_key_naming: ArrayKeyNaming,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            fingerprint_mode: FingerprintMode::default(),
            array_key_naming: ArrayKeyNaming::default(),
        }
    }
}

impl CodecOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_fingerprint_mode(mut self, mode: FingerprintMode) -> Self {
        self.fingerprint_mode = mode;
        self
    }

    pub fn with_array_key_naming(mut self, naming: ArrayKeyNaming) -> Self {
        self.array_key_naming = naming;
        self
    }
}
