//! # In-Memory Backend
//!
//! The key space is an ordered map so prefix scans are a range walk rather
//! than a full pass.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::adapter::{KeyKind, KvStore};
use super::errors::{StoreError, StoreResult};

/// A value stored at one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Entry {
    Hash(BTreeMap<String, String>),
    Set(BTreeSet<String>),
    Str(String),
}

impl Entry {
    fn kind(&self) -> KeyKind {
        match self {
            Entry::Hash(_) => KeyKind::Hash,
            Entry::Set(_) => KeyKind::Set,
            Entry::Str(_) => KeyKind::Str,
        }
    }
}

fn wrong_type(key: &str, expected: KeyKind, found: &Entry) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected: expected.as_str(),
        found: found.kind().as_str(),
    }
}

/// The whole key space, shared by the memory and file backends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyspace {
    entries: BTreeMap<String, Entry>,
}

impl Keyspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hash_set(&mut self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()));
        match entry {
            Entry::Hash(fields) => {
                fields.insert(field.to_string(), value.to_string());
                Ok(())
            }
            other => Err(wrong_type(key, KeyKind::Hash, other)),
        }
    }

    pub fn hash_touch(&mut self, key: &str) -> StoreResult<()> {
        match self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()))
        {
            Entry::Hash(_) => Ok(()),
            other => Err(wrong_type(key, KeyKind::Hash, other)),
        }
    }

    pub fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(other) => Err(wrong_type(key, KeyKind::Hash, other)),
        }
    }

    pub fn hash_get_all(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        match self.entries.get(key) {
            None => Ok(BTreeMap::new()),
            Some(Entry::Hash(fields)) => Ok(fields.clone()),
            Some(other) => Err(wrong_type(key, KeyKind::Hash, other)),
        }
    }

    pub fn set_add(&mut self, key: &str, member: &str) -> StoreResult<()> {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()));
        match entry {
            Entry::Set(members) => {
                members.insert(member.to_string());
                Ok(())
            }
            other => Err(wrong_type(key, KeyKind::Set, other)),
        }
    }

    pub fn set_members(&self, key: &str) -> StoreResult<BTreeSet<String>> {
        match self.entries.get(key) {
            None => Ok(BTreeSet::new()),
            Some(Entry::Set(members)) => Ok(members.clone()),
            Some(other) => Err(wrong_type(key, KeyKind::Set, other)),
        }
    }

    pub fn keys_matching(&self, prefix: &str) -> Vec<String> {
        self.entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn delete_key(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn kind(&self, key: &str) -> Option<KeyKind> {
        self.entries.get(key).map(Entry::kind)
    }

    pub fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Str(value)) => Ok(Some(value.clone())),
            Some(other) => Err(wrong_type(key, KeyKind::Str, other)),
        }
    }

    pub fn put(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), Entry::Str(value.to_string()));
    }
}

/// In-memory store backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    keyspace: RwLock<Keyspace>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.keyspace.read().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<T>(&self, f: impl FnOnce(&Keyspace) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self
            .keyspace
            .read()
            .map_err(|_| StoreError::Internal("keyspace lock poisoned".into()))?;
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Keyspace) -> StoreResult<T>) -> StoreResult<T> {
        let mut guard = self
            .keyspace
            .write()
            .map_err(|_| StoreError::Internal("keyspace lock poisoned".into()))?;
        f(&mut guard)
    }
}

impl KvStore for MemoryStore {
    fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        self.write(|ks| ks.hash_set(key, field, value))
    }

    fn hash_touch(&self, key: &str) -> StoreResult<()> {
        self.write(|ks| ks.hash_touch(key))
    }

    fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.read(|ks| ks.hash_get(key, field))
    }

    fn hash_get_all(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        self.read(|ks| ks.hash_get_all(key))
    }

    fn set_add(&self, key: &str, member: &str) -> StoreResult<()> {
        self.write(|ks| ks.set_add(key, member))
    }

    fn set_members(&self, key: &str) -> StoreResult<BTreeSet<String>> {
        self.read(|ks| ks.set_members(key))
    }

    fn keys_matching(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.read(|ks| Ok(ks.keys_matching(prefix)))
    }

    fn delete_key(&self, key: &str) -> StoreResult<bool> {
        self.write(|ks| Ok(ks.delete_key(key)))
    }

    fn kind(&self, key: &str) -> StoreResult<Option<KeyKind>> {
        self.read(|ks| Ok(ks.kind(key)))
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.read(|ks| ks.get(key))
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        self.write(|ks| {
            ks.put(key, value);
            Ok(())
        })
    }
}
