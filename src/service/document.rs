//! # Document Service
//!
//! The public surface over the codec: whole-document save/update, read,
//! cascading delete, version tokens and raw key access.

use std::sync::Arc;

use serde_json::Value;

use crate::codec::{
    CodecError, CodecOptions, CodecResult, Decoder, DeleteReport, DeletionWalker, Document,
    EncodeReport, Encoder, Fingerprinter, Node, FINGERPRINT_FIELD,
};
use crate::observability::{CodecMetrics, ObservationScope};
use crate::store::KvStore;

/// Outcome of a save or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub key: String,
    pub fingerprint: String,
    pub report: EncodeReport,
}

#[derive(Debug)]
pub struct DocumentService<S: KvStore> {
    store: S,
    options: CodecOptions,
    fingerprinter: Fingerprinter,
    metrics: Arc<CodecMetrics>,
}

impl<S: KvStore> DocumentService<S> {
    pub fn new(store: S, options: CodecOptions) -> Self {
        Self {
            store,
            fingerprinter: Fingerprinter::new(options.fingerprint_mode),
            options,
            metrics: Arc::new(CodecMetrics::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn metrics(&self) -> Arc<CodecMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Encodes `document` under `root_key` and stamps a fresh version token.
    ///
    /// # Errors
    ///
    /// - `Validation` / `DepthExceeded` if the document cannot be encoded;
    ///   nothing is written in that case
    /// - `KeyMismatch` if `root_key` is not the document's own NodeKey
    /// - `Store` if a write fails; earlier writes are not rolled back
    pub fn save(&self, root_key: &str, document: &Value) -> CodecResult<String> {
        self.write_document("DOCUMENT_SAVE", root_key, document)
            .map(|outcome| outcome.fingerprint)
    }

    /// Re-encodes the whole document. Fields absent from `document` but
    /// present on stored records are left in place.
    pub fn update(&self, root_key: &str, document: &Value) -> CodecResult<String> {
        self.write_document("DOCUMENT_UPDATE", root_key, document)
            .map(|outcome| outcome.fingerprint)
    }

    /// Like [`save`](Self::save) but returns what was written
    pub fn save_with_report(&self, root_key: &str, document: &Value) -> CodecResult<SaveOutcome> {
        self.write_document("DOCUMENT_SAVE", root_key, document)
    }

    fn write_document(
        &self,
        op: &'static str,
        root_key: &str,
        document: &Value,
    ) -> CodecResult<SaveOutcome> {
        let scope = ObservationScope::new(op, &[("key", root_key)]);
        match self.encode_and_stamp(root_key, document) {
            Ok(outcome) => {
                self.metrics.record_save(
                    outcome.report.nodes,
                    outcome.report.fields_written,
                    outcome.report.edges_written,
                );
                let nodes = outcome.report.nodes.to_string();
                let edges = outcome.report.edges_written.to_string();
                scope.complete_with(&[("nodes", nodes.as_str()), ("edges", edges.as_str())]);
                Ok(outcome)
            }
            Err(e) => {
                if e.is_client_error() {
                    self.metrics.increment_validation_failures();
                }
                scope.fail(e.code(), &e.to_string());
                Err(e)
            }
        }
    }

    fn encode_and_stamp(&self, root_key: &str, document: &Value) -> CodecResult<SaveOutcome> {
        let node = Node::parse(document, self.options.max_depth)?;
        if node.key().as_str() != root_key {
            return Err(CodecError::KeyMismatch {
                expected: root_key.to_string(),
                found: node.key().to_string(),
            });
        }

        let written = self.write_tree(root_key, &node, document);
        let flushed = self.store.flush();
        let outcome = written?;
        flushed?;
        Ok(outcome)
    }

    fn write_tree(
        &self,
        root_key: &str,
        node: &Node,
        document: &Value,
    ) -> CodecResult<SaveOutcome> {
        let report = Encoder::new(&self.store).encode(node)?;
        let fingerprint = self.fingerprinter.generate(root_key, document);
        self.store.hash_set(root_key, FINGERPRINT_FIELD, &fingerprint)?;

        Ok(SaveOutcome {
            key: root_key.to_string(),
            fingerprint,
            report,
        })
    }

    /// Reconstructs the document at `root_key`; an absent key yields an
    /// empty document.
    pub fn get(&self, root_key: &str) -> CodecResult<Document> {
        let scope = ObservationScope::new("DOCUMENT_GET", &[("key", root_key)]);
        match Decoder::new(&self.store, self.options).decode(root_key) {
            Ok(doc) => {
                self.metrics.increment_documents_read();
                let attributes = doc.len().to_string();
                scope.complete_with(&[("attributes", attributes.as_str())]);
                Ok(doc)
            }
            Err(e) => {
                scope.fail(e.code(), &e.to_string());
                Err(e)
            }
        }
    }

    /// Like [`get`](Self::get) but fails with `NotFound` when no record
    /// exists at `root_key`.
    pub fn get_existing(&self, root_key: &str) -> CodecResult<Document> {
        if !self.store.exists(root_key)? {
            return Err(CodecError::NotFound(root_key.to_string()));
        }
        self.get(root_key)
    }

    /// Removes the document and every node reachable from it.
    pub fn delete(&self, root_key: &str) -> CodecResult<DeleteReport> {
        let scope = ObservationScope::new("DOCUMENT_DELETE", &[("key", root_key)]);
        let walked = DeletionWalker::new(&self.store, self.options).delete(root_key);
        let flushed = self.store.flush().map_err(CodecError::from);
        match walked.and_then(|report| flushed.map(|_| report)) {
            Ok(report) => {
                self.metrics.record_delete(report.keys_removed);
                let removed = report.keys_removed.to_string();
                scope.complete_with(&[("keys_removed", removed.as_str())]);
                Ok(report)
            }
            Err(e) => {
                scope.fail(e.code(), &e.to_string());
                Err(e)
            }
        }
    }

    /// Version token stamped by the last save, if any
    pub fn fingerprint(&self, root_key: &str) -> CodecResult<Option<String>> {
        self.observe("DOCUMENT_FINGERPRINT", root_key, || {
            Ok(self.store.hash_get(root_key, FINGERPRINT_FIELD)?)
        })
    }

    /// True when `candidate` equals the stored token. A missing document
    /// matches nothing.
    pub fn matches_fingerprint(&self, root_key: &str, candidate: &str) -> CodecResult<bool> {
        Ok(self
            .fingerprint(root_key)?
            .map(|current| current == candidate.trim_matches('"'))
            .unwrap_or(false))
    }

    pub fn exists(&self, root_key: &str) -> CodecResult<bool> {
        self.observe("DOCUMENT_EXISTS", root_key, || Ok(self.store.exists(root_key)?))
    }

    pub fn read_raw(&self, key: &str) -> CodecResult<Option<String>> {
        self.observe("RAW_READ", key, || {
            self.metrics.increment_raw_operations();
            Ok(self.store.get(key)?)
        })
    }

    pub fn write_raw(&self, key: &str, value: &str) -> CodecResult<()> {
        self.observe("RAW_WRITE", key, || {
            self.metrics.increment_raw_operations();
            self.store.put(key, value)?;
            Ok(self.store.flush()?)
        })
    }

    /// Removes a single key without following edges
    pub fn delete_raw(&self, key: &str) -> CodecResult<bool> {
        self.observe("RAW_DELETE", key, || {
            self.metrics.increment_raw_operations();
            let removed = self.store.delete_key(key)?;
            self.store.flush()?;
            Ok(removed)
        })
    }

    /// Runs `f` inside a scope named `op`, logging its outcome
    fn observe<T>(
        &self,
        op: &'static str,
        key: &str,
        f: impl FnOnce() -> CodecResult<T>,
    ) -> CodecResult<T> {
        let scope = ObservationScope::new(op, &[("key", key)]);
        match f() {
            Ok(value) => {
                scope.complete();
                Ok(value)
            }
            Err(e) => {
                scope.fail(e.code(), &e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{identity_fingerprint, ArrayKeyNaming, FingerprintMode};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service() -> DocumentService<MemoryStore> {
        DocumentService::new(MemoryStore::new(), CodecOptions::default())
    }

    fn plan() -> Value {
        json!({
            "objectType": "plan", "objectId": "abc", "copay": 20,
            "costSharing": {"objectType": "cs", "objectId": "c1", "amount": 5},
            "members": [
                {"objectType": "member", "objectId": "m1", "name": "Alice"},
                {"objectType": "member", "objectId": "m2", "name": "Bob"}
            ]
        })
    }

    #[test]
    fn test_save_returns_identity_token() {
        let svc = service();
        let token = svc.save("plan_abc", &plan()).unwrap();
        assert_eq!(token, identity_fingerprint("plan_abc"));
        assert_eq!(svc.fingerprint("plan_abc").unwrap(), Some(token));
    }

    #[test]
    fn test_key_mismatch_writes_nothing() {
        let svc = service();
        let err = svc.save("plan_other", &plan()).unwrap_err();
        assert!(matches!(err, CodecError::KeyMismatch { .. }));
        assert!(svc.store().is_empty());
        assert_eq!(svc.metrics().snapshot().validation_failures, 1);
    }

    #[test]
    fn test_invalid_nested_object_writes_nothing() {
        let svc = service();
        let mut doc = plan();
        doc["members"][1]
            .as_object_mut()
            .unwrap()
            .remove("objectType");

        let err = svc.save("plan_abc", &doc).unwrap_err();
        assert_eq!(err.code(), "DOCGRAPH_VALIDATION_FAILED");
        assert!(svc.store().is_empty());
    }

    #[test]
    fn test_get_missing_vs_get_existing() {
        let svc = service();
        assert!(svc.get("plan_none").unwrap().is_empty());
        assert!(matches!(
            svc.get_existing("plan_none"),
            Err(CodecError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_with_content_fingerprint() {
        let svc = DocumentService::new(
            MemoryStore::new(),
            CodecOptions::default().with_fingerprint_mode(FingerprintMode::Content),
        );
        let first = svc.save("plan_abc", &plan()).unwrap();

        let mut changed = plan();
        changed["copay"] = json!(30);
        let second = svc.update("plan_abc", &changed).unwrap();

        assert_ne!(first, second);
        assert!(svc.matches_fingerprint("plan_abc", &second).unwrap());
        assert!(!svc.matches_fingerprint("plan_abc", &first).unwrap());
        assert_eq!(svc.get("plan_abc").unwrap()["copay"], json!(30));
    }

    #[test]
    fn test_quoted_etag_matches() {
        let svc = service();
        let token = svc.save("plan_abc", &plan()).unwrap();
        assert!(svc
            .matches_fingerprint("plan_abc", &format!("\"{}\"", token))
            .unwrap());
        assert!(!svc.matches_fingerprint("plan_zzz", &token).unwrap());
    }

    #[test]
    fn test_delete_cascades() {
        let svc = DocumentService::new(
            MemoryStore::new(),
            CodecOptions::default().with_array_key_naming(ArrayKeyNaming::Attribute),
        );
        svc.save("plan_abc", &plan()).unwrap();
        let report = svc.delete("plan_abc").unwrap();

        assert_eq!(report.nodes, 4);
        assert_eq!(report.keys_removed, 6);
        assert!(svc.store().is_empty());
        assert!(!svc.exists("plan_abc").unwrap());
        assert_eq!(svc.metrics().snapshot().documents_deleted, 1);
    }

    #[test]
    fn test_raw_access() {
        let svc = service();
        svc.write_raw("note", "hello").unwrap();
        assert_eq!(svc.read_raw("note").unwrap().as_deref(), Some("hello"));
        assert!(svc.delete_raw("note").unwrap());
        assert!(!svc.delete_raw("note").unwrap());
        assert_eq!(svc.read_raw("note").unwrap(), None);
        assert_eq!(svc.metrics().snapshot().raw_operations, 5);
    }

    #[test]
    fn test_lookups_and_raw_failures_are_reported() {
        let svc = service();
        svc.save("plan_abc", &plan()).unwrap();

        assert!(svc.exists("plan_abc").unwrap());
        assert!(svc.fingerprint("plan_abc").unwrap().is_some());
        let err = svc.read_raw("plan_abc").unwrap_err();
        assert_eq!(err.code(), "DOCGRAPH_STORE_WRONG_TYPE");
        assert_eq!(svc.metrics().snapshot().raw_operations, 1);
    }

    #[test]
    fn test_childless_nested_object_is_addressable() {
        let svc = service();
        let doc = json!({
            "objectType": "plan", "objectId": "abc", "copay": 20,
            "costSharing": {"objectType": "cs", "objectId": "c1"}
        });
        svc.save("plan_abc", &doc).unwrap();

        assert!(svc.exists("cs_c1").unwrap());
        assert!(svc.get_existing("cs_c1").unwrap().is_empty());
        assert_eq!(svc.get("plan_abc").unwrap()["costSharing"], json!({}));
    }
}
