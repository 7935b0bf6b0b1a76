//! Deletion walker: cascading removal of everything reachable from a node
//!
//! Walks the same shape as the decoder. Edge sets are emptied child-first and
//! the node's own record goes last, so a walk that fails partway leaves the
//! root addressable and a second delete can finish the job. There is no
//! verification pass and no retry.

use std::collections::HashSet;

use super::errors::{CodecError, CodecResult};
use super::node::edge_prefix;
use super::options::CodecOptions;
use crate::store::{KeyKind, KvStore};

/// What one delete removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Nodes visited, root included
    pub nodes: usize,
    /// Keys that existed and were removed
    pub keys_removed: usize,
}

pub struct DeletionWalker<'a, S: KvStore + ?Sized> {
    store: &'a S,
    options: CodecOptions,
}

impl<'a, S: KvStore + ?Sized> DeletionWalker<'a, S> {
    pub fn new(store: &'a S, options: CodecOptions) -> Self {
        Self { store, options }
    }

    /// Removes `root_key`, its edge sets and every node they reach.
    ///
    /// Nodes reached twice (shared children, cycles) are removed once.
    pub fn delete(&self, root_key: &str) -> CodecResult<DeleteReport> {
        let mut report = DeleteReport::default();
        let mut visited = HashSet::new();
        self.walk(root_key, 1, &mut visited, &mut report)?;
        Ok(report)
    }

    fn walk(
        &self,
        key: &str,
        depth: usize,
        visited: &mut HashSet<String>,
        report: &mut DeleteReport,
    ) -> CodecResult<()> {
        if !visited.insert(key.to_string()) {
            return Ok(());
        }
        if depth > self.options.max_depth {
            return Err(CodecError::DepthExceeded {
                key: key.to_string(),
                max_depth: self.options.max_depth,
            });
        }
        report.nodes += 1;

        for edge in self.store.keys_matching(&edge_prefix(key))? {
            if self.store.kind(&edge)? != Some(KeyKind::Set) {
                continue;
            }
            for member in self.store.set_members(&edge)? {
                self.walk(&member, depth + 1, visited, report)?;
            }
            if self.store.delete_key(&edge)? {
                report.keys_removed += 1;
            }
        }

        if self.store.delete_key(key)? {
            report.keys_removed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_removes_reachable_subgraph_only() {
        let store = MemoryStore::new();
        store.hash_set("plan_1", "a", "1").unwrap();
        store.set_add("plan_1_cs", "cs_1").unwrap();
        store.hash_set("cs_1", "amount", "5").unwrap();
        store.set_add("plan_1_members", "member_1").unwrap();
        store.set_add("plan_1_members", "member_2").unwrap();
        store.hash_set("member_1", "n", "A").unwrap();
        store.hash_set("member_2", "n", "B").unwrap();
        store.set_add("member_2_deps", "dep_1").unwrap();
        store.hash_set("dep_1", "n", "C").unwrap();
        store.hash_set("plan_2", "a", "1").unwrap();

        let report = DeletionWalker::new(&store, CodecOptions::default())
            .delete("plan_1")
            .unwrap();

        assert_eq!(report.nodes, 5);
        assert_eq!(report.keys_removed, 8);
        assert!(store.keys_matching("plan_1").unwrap().is_empty());
        assert_eq!(store.keys_matching("").unwrap(), vec!["plan_2".to_string()]);
    }

    #[test]
    fn test_missing_root_removes_nothing() {
        let store = MemoryStore::new();
        let report = DeletionWalker::new(&store, CodecOptions::default())
            .delete("plan_x")
            .unwrap();
        assert_eq!(report.keys_removed, 0);
    }

    #[test]
    fn test_cycle_terminates() {
        let store = MemoryStore::new();
        store.hash_set("a_1", "v", "1").unwrap();
        store.set_add("a_1_next", "b_1").unwrap();
        store.hash_set("b_1", "v", "2").unwrap();
        store.set_add("b_1_next", "a_1").unwrap();

        let report = DeletionWalker::new(&store, CodecOptions::default())
            .delete("a_1")
            .unwrap();
        assert_eq!(report.nodes, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unrelated_keys_under_prefix_survive() {
        let store = MemoryStore::new();
        store.hash_set("plan_1", "a", "1").unwrap();
        store.put("plan_1_note", "keep").unwrap();

        DeletionWalker::new(&store, CodecOptions::default())
            .delete("plan_1")
            .unwrap();
        assert_eq!(store.get("plan_1_note").unwrap().as_deref(), Some("keep"));
    }
}
