//! Key-value store adapters
//!
//! The codec talks to its backing store only through [`KvStore`]: hashes,
//! sets, plain strings and a prefix scan. Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local, used by tests and embedders
//! - [`FileStore`]: the same key space persisted to a checksummed JSON file

mod adapter;
mod checksum;
mod errors;
mod file;
mod memory;

pub use adapter::{KeyKind, KvStore};
pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::{Entry, Keyspace, MemoryStore};
