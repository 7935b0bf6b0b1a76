//! Codec counters
//!
//! Monotonic, reset only when the registry is created. Relaxed atomics; a
//! snapshot is not a consistent cut across counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct CodecMetrics {
    documents_saved: AtomicU64,
    documents_read: AtomicU64,
    documents_deleted: AtomicU64,
    nodes_written: AtomicU64,
    fields_written: AtomicU64,
    edges_written: AtomicU64,
    keys_removed: AtomicU64,
    raw_operations: AtomicU64,
    validation_failures: AtomicU64,
}

impl CodecMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful save or update
    pub fn record_save(&self, nodes: usize, fields: usize, edges: usize) {
        self.documents_saved.fetch_add(1, Ordering::Relaxed);
        self.nodes_written.fetch_add(nodes as u64, Ordering::Relaxed);
        self.fields_written.fetch_add(fields as u64, Ordering::Relaxed);
        self.edges_written.fetch_add(edges as u64, Ordering::Relaxed);
    }

    pub fn increment_documents_read(&self) {
        self.documents_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self, keys_removed: usize) {
        self.documents_deleted.fetch_add(1, Ordering::Relaxed);
        self.keys_removed.fetch_add(keys_removed as u64, Ordering::Relaxed);
    }

    /// Counts one raw key read, write or delete
    pub fn increment_raw_operations(&self) {
        self.raw_operations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_saved: self.documents_saved.load(Ordering::Relaxed),
            documents_read: self.documents_read.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            nodes_written: self.nodes_written.load(Ordering::Relaxed),
            fields_written: self.fields_written.load(Ordering::Relaxed),
            edges_written: self.edges_written.load(Ordering::Relaxed),
            keys_removed: self.keys_removed.load(Ordering::Relaxed),
            raw_operations: self.raw_operations.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub documents_saved: u64,
    pub documents_read: u64,
    pub documents_deleted: u64,
    pub nodes_written: u64,
    pub fields_written: u64,
    pub edges_written: u64,
    pub keys_removed: u64,
    pub raw_operations: u64,
    pub validation_failures: u64,
}
