//! # Store Adapter Trait
//!
//! The primitive capabilities the codec needs from a backing key-value store:
//! field-addressed hashes, unordered member sets, plain string values and a
//! prefix scan over key names. Each call is atomic on its own; nothing here
//! groups several calls into one unit. Buffering backends only guarantee
//! durability once `flush` returns.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::errors::StoreResult;

/// The kind of value held at a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Hash,
    Set,
    Str,
}

impl KeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Hash => "hash",
            KeyKind::Set => "set",
            KeyKind::Str => "string",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend trait for the key-value store
pub trait KvStore: Send + Sync + fmt::Debug {
    /// Set one field of the hash at `key`
    fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Create an empty hash at `key` if nothing is stored there
    fn hash_touch(&self, key: &str) -> StoreResult<()>;

    /// Read one field of the hash at `key`
    fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Read every field of the hash at `key` (empty when absent)
    fn hash_get_all(&self, key: &str) -> StoreResult<BTreeMap<String, String>>;

    /// Add `member` to the set at `key`
    fn set_add(&self, key: &str, member: &str) -> StoreResult<()>;

    /// Members of the set at `key` (empty when absent)
    fn set_members(&self, key: &str) -> StoreResult<BTreeSet<String>>;

    /// Every stored key starting with `prefix`, in ascending order
    fn keys_matching(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Remove `key`, returning whether it existed
    fn delete_key(&self, key: &str) -> StoreResult<bool>;

    /// Remove several keys, returning how many existed
    fn delete_keys(&self, keys: &[String]) -> StoreResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.delete_key(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Check if `key` exists
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.kind(key)?.is_some())
    }

    /// Kind of value held at `key`
    fn kind(&self, key: &str) -> StoreResult<Option<KeyKind>>;

    /// Read a plain string value
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a plain string value, replacing whatever was at `key`
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Make every preceding write durable. Backends that persist on each
    /// call keep the default.
    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}
