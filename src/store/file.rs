//! # File-Persisted Backend
//!
//! Keeps the key space in memory and writes it to `<data_dir>/store.json`
//! on `flush`. Mutations only mark the key space dirty, so one logical
//! operation costs one snapshot write however many fields it touches. A
//! store dropped while dirty flushes on the way out.
//!
//! The file carries a CRC32 of the serialized key space; a mismatch on open
//! is reported as corruption and never silently ignored. Writes go to a
//! temporary file which is fsynced and renamed over the previous snapshot,
//! so a crash leaves either the old or the new key space.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::adapter::{KeyKind, KvStore};
use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StoreError, StoreResult};
use super::memory::Keyspace;
use crate::observability::Logger;

const STORE_FILE: &str = "store.json";
const STORE_TMP_FILE: &str = "store.json.tmp";

#[derive(Deserialize)]
struct Snapshot {
    checksum: u32,
    keyspace: Keyspace,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    checksum: u32,
    keyspace: &'a Keyspace,
}

#[derive(Debug, Default)]
struct State {
    keyspace: Keyspace,
    dirty: bool,
}

/// File-backed store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tmp_path: PathBuf,
    state: RwLock<State>,
}

impl FileStore {
    /// Opens the store under `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corruption` if the snapshot cannot be parsed or its
    /// checksum does not match.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir).map_err(|e| {
            StoreError::IoError(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        let path = data_dir.join(STORE_FILE);
        let keyspace = if path.exists() {
            Self::load(&path)?
        } else {
            Keyspace::new()
        };

        Ok(Self {
            tmp_path: data_dir.join(STORE_TMP_FILE),
            path,
            state: RwLock::new(State {
                keyspace,
                dirty: false,
            }),
        })
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when in-memory changes have not reached the snapshot file
    pub fn is_dirty(&self) -> bool {
        self.state.read().map(|s| s.dirty).unwrap_or(true)
    }

    fn load(path: &Path) -> StoreResult<Keyspace> {
        let bytes = fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Corruption(format!("{}: unreadable snapshot: {}", path.display(), e))
        })?;

        let body = serde_json::to_vec(&snapshot.keyspace)
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        if !verify_checksum(&body, snapshot.checksum) {
            return Err(StoreError::Corruption(format!(
                "{}: checksum mismatch",
                path.display()
            )));
        }

        Ok(snapshot.keyspace)
    }

    fn persist(&self, keyspace: &Keyspace) -> StoreResult<()> {
        let body = serde_json::to_vec(keyspace).map_err(|e| StoreError::Internal(e.to_string()))?;
        let snapshot = SnapshotRef {
            checksum: compute_checksum(&body),
            keyspace,
        };
        let bytes =
            serde_json::to_vec(&snapshot).map_err(|e| StoreError::Internal(e.to_string()))?;

        let mut file = File::create(&self.tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&self.tmp_path, &self.path)?;
        Ok(())
    }

    fn lock_state(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Internal("keyspace lock poisoned".into()))
    }

    fn read<T>(&self, f: impl FnOnce(&Keyspace) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::Internal("keyspace lock poisoned".into()))?;
        f(&guard.keyspace)
    }

    /// Applies `f` in place. Keyspace operations check the key's kind before
    /// touching it, so a failed call changes nothing.
    fn write<T>(&self, f: impl FnOnce(&mut Keyspace) -> StoreResult<T>) -> StoreResult<T> {
        let mut guard = self.lock_state()?;
        let out = f(&mut guard.keyspace)?;
        guard.dirty = true;
        Ok(out)
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            let path = self.path.display().to_string();
            let reason = e.to_string();
            Logger::error(
                "STORE_FLUSH_FAILED",
                &[("path", path.as_str()), ("code", e.code()), ("reason", reason.as_str())],
            );
        }
    }
}

impl KvStore for FileStore {
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
        let mut guard = self.lock_state()?;
        let removed = guard.keyspace.delete_key(key);
        guard.dirty |= removed;
        Ok(removed)
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

    fn flush(&self) -> StoreResult<()> {
        let mut guard = self.lock_state()?;
        if !guard.dirty {
            return Ok(());
        }
        self.persist(&guard.keyspace)?;
        guard.dirty = false;
        Ok(())
    }
}
