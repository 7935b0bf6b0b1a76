//! Document service
//!
//! Wraps a [`KvStore`](crate::store::KvStore) with the codec and exposes the
//! operations callers use: save, get, update, cascading delete, version
//! tokens and raw key access. Every call is a sequence of independent store
//! commands; there is no rollback if one of them fails.

mod document;

pub use document::{DocumentService, SaveOutcome};
