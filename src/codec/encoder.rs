//! Encoder: document tree → node records and edge sets
//!
//! Every node gets a record, even one whose attributes are all nested
//! objects, so each edge-set member names an existing key. Children are
//! written before the edge-set member that points at them, so a reader
//! following an edge never finds a member whose record was not yet started.
//! Nothing is deleted: fields dropped from a document since the last
//! save stay on the record.

use serde_json::Value;

use super::errors::{CodecError, CodecResult};
use super::node::{Attribute, Node, NodeKey, SCALAR_LIST_SUFFIX};
use crate::store::KvStore;

/// What one encode pass wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeReport {
    /// Nodes visited, root included
    pub nodes: usize,
    /// Record fields written
    pub fields_written: usize,
    /// Edge-set members added
    pub edges_written: usize,
}

pub struct Encoder<'a, S: KvStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KvStore + ?Sized> Encoder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Writes every record and edge set of `root`.
    pub fn encode(&self, root: &Node) -> CodecResult<EncodeReport> {
        let mut report = EncodeReport::default();
        self.encode_node(root, &mut report)?;
        Ok(report)
    }

    fn encode_node(&self, node: &Node, report: &mut EncodeReport) -> CodecResult<()> {
        report.nodes += 1;
        let key = node.key();
        self.store.hash_touch(key.as_str())?;

        for (name, attribute) in node.attributes() {
            match attribute {
                Attribute::Scalar(scalar) => {
                    self.store.hash_set(key.as_str(), name, &scalar.to_field_text())?;
                    report.fields_written += 1;
                }
                Attribute::Object(child) => {
                    self.encode_node(child, report)?;
                    self.link(key, name, child.key(), report)?;
                }
                Attribute::Array(children) => {
                    for child in children {
                        self.encode_node(child, report)?;
                        self.link(key, name, child.key(), report)?;
                    }
                }
                Attribute::ScalarList(items) => {
                    let list: Vec<Value> = items.iter().map(|s| s.to_json()).collect();
                    let text = serde_json::to_string(&list).map_err(|e| CodecError::Malformed {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
                    let field = format!("{}{}", name, SCALAR_LIST_SUFFIX);
                    self.store.hash_set(key.as_str(), &field, &text)?;
                    report.fields_written += 1;
                }
            }
        }

        Ok(())
    }

    fn link(
        &self,
        parent: &NodeKey,
        attribute: &str,
        child: &NodeKey,
        report: &mut EncodeReport,
    ) -> CodecResult<()> {
        self.store.set_add(&parent.edge_key(attribute), child.as_str())?;
        report.edges_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyKind, MemoryStore};
    use serde_json::json;

    fn encode(store: &MemoryStore, doc: serde_json::Value) -> EncodeReport {
        let node = Node::parse(&doc, 16).unwrap();
        Encoder::new(store).encode(&node).unwrap()
    }

    #[test]
    fn test_plan_layout() {
        let store = MemoryStore::new();
        let report = encode(
            &store,
            json!({
                "objectType": "plan", "objectId": "abc", "copay": 20,
                "costSharing": {"objectType": "cs", "objectId": "c1", "amount": 5},
                "members": [
                    {"objectType": "member", "objectId": "m1", "name": "Alice"},
                    {"objectType": "member", "objectId": "m2", "name": "Bob"}
                ]
            }),
        );

        assert_eq!(report.nodes, 4);
        assert_eq!(report.edges_written, 3);
        assert_eq!(report.fields_written, 4);

        let plan = store.hash_get_all("plan_abc").unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan["copay"], "20");

        let cs_edge = store.set_members("plan_abc_costSharing").unwrap();
        assert_eq!(cs_edge.into_iter().collect::<Vec<_>>(), vec!["cs_c1"]);
        assert_eq!(store.hash_get("cs_c1", "amount").unwrap().as_deref(), Some("5"));

        let members = store.set_members("plan_abc_members").unwrap();
        assert_eq!(
            members.into_iter().collect::<Vec<_>>(),
            vec!["member_m1", "member_m2"]
        );
        assert_eq!(store.hash_get("member_m1", "name").unwrap().as_deref(), Some("Alice"));
        assert_eq!(store.hash_get("member_m2", "name").unwrap().as_deref(), Some("Bob"));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_nodes_without_fields_get_records() {
        let store = MemoryStore::new();
        encode(
            &store,
            json!({
                "objectType": "plan", "objectId": "abc", "copay": 20,
                "costSharing": {"objectType": "cs", "objectId": "c1"},
                "services": [
                    {"objectType": "ps", "objectId": "p1",
                     "linked": {"objectType": "svc", "objectId": "s1", "name": "x"}},
                    {"objectType": "ps", "objectId": "p2",
                     "linked": {"objectType": "svc", "objectId": "s2", "name": "y"}}
                ]
            }),
        );

        for edge in store.keys_matching("").unwrap() {
            if store.kind(&edge).unwrap() != Some(KeyKind::Set) {
                continue;
            }
            for member in store.set_members(&edge).unwrap() {
                assert_eq!(
                    store.kind(&member).unwrap(),
                    Some(KeyKind::Hash),
                    "member {} of {} has no record",
                    member,
                    edge
                );
            }
        }
        assert!(store.hash_get_all("cs_c1").unwrap().is_empty());
        assert!(store.hash_get_all("ps_p1").unwrap().is_empty());
    }

    #[test]
    fn test_identity_not_stored() {
        let store = MemoryStore::new();
        encode(&store, json!({"objectType": "plan", "objectId": "1", "a": "x"}));

        let fields = store.hash_get_all("plan_1").unwrap();
        assert!(!fields.contains_key("objectType"));
        assert!(!fields.contains_key("objectId"));
    }

    #[test]
    fn test_scalar_list_stored_on_parent() {
        let store = MemoryStore::new();
        encode(
            &store,
            json!({"objectType": "plan", "objectId": "1", "tags": ["a", 2], "none": []}),
        );

        assert_eq!(
            store.hash_get("plan_1", "tags[]").unwrap().as_deref(),
            Some(r#"["a",2]"#)
        );
        assert_eq!(store.hash_get("plan_1", "none[]").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.kind("plan_1_tags").unwrap(), None);
    }

    #[test]
    fn test_save_overwrites_but_keeps_stale_fields() {
        let store = MemoryStore::new();
        encode(
            &store,
            json!({"objectType": "plan", "objectId": "1", "a": 1, "b": 2}),
        );
        encode(&store, json!({"objectType": "plan", "objectId": "1", "a": 3}));

        let fields = store.hash_get_all("plan_1").unwrap();
        assert_eq!(fields["a"], "3");
        assert_eq!(fields["b"], "2");
    }

    #[test]
    fn test_store_failure_propagates() {
        let store = MemoryStore::new();
        store.put("plan_1", "not a hash").unwrap();

        let node = Node::parse(&json!({"objectType": "plan", "objectId": "1", "a": 1}), 4).unwrap();
        let err = Encoder::new(&store).encode(&node).unwrap_err();
        assert_eq!(err.code(), "DOCGRAPH_STORE_WRONG_TYPE");
        assert_eq!(store.kind("plan_1").unwrap(), Some(KeyKind::Str));
    }
}
