//! Decoder: node records and edge sets → document
//!
//! For a node key `K` the decoder reads the record at `K` and every set key
//! under `K_`. Each such set is an edge: one member decodes as a nested
//! object, several members as a nested array. A one-element array therefore
//! comes back as a plain object; the stored layout carries no cardinality.
//!
//! Record values that parse fully as an `i64` are returned as numbers, which
//! drops leading zeros from numeric-looking identifiers.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::errors::{CodecError, CodecResult};
use super::node::{edge_prefix, FINGERPRINT_FIELD, SCALAR_LIST_SUFFIX};
use super::options::{ArrayKeyNaming, CodecOptions};
use crate::store::{KeyKind, KvStore};

/// A reconstructed document body (identity fields are not restored)
pub type Document = Map<String, Value>;

pub struct Decoder<'a, S: KvStore + ?Sized> {
    store: &'a S,
    options: CodecOptions,
}

impl<'a, S: KvStore + ?Sized> Decoder<'a, S> {
    pub fn new(store: &'a S, options: CodecOptions) -> Self {
        Self { store, options }
    }

    /// Reconstructs the document rooted at `root_key`.
    ///
    /// An absent key yields an empty document.
    ///
    /// # Errors
    ///
    /// - `CycleDetected` if a node is reachable from itself
    /// - `DepthExceeded` past `max_depth` levels
    /// - `Malformed` if a scalar-list field is not a JSON array
    /// - `Store` for any store failure
    pub fn decode(&self, root_key: &str) -> CodecResult<Document> {
        let mut path = HashSet::new();
        self.decode_node(root_key, 1, &mut path)
    }

    fn decode_node(
        &self,
        key: &str,
        depth: usize,
        path: &mut HashSet<String>,
    ) -> CodecResult<Document> {
        if depth > self.options.max_depth {
            return Err(CodecError::DepthExceeded {
                key: key.to_string(),
                max_depth: self.options.max_depth,
            });
        }
        if !path.insert(key.to_string()) {
            return Err(CodecError::CycleDetected(key.to_string()));
        }

        let mut output = self.read_record(key)?;

        let prefix = edge_prefix(key);
        for edge in self.store.keys_matching(&prefix)? {
            if self.store.kind(&edge)? != Some(KeyKind::Set) {
                continue;
            }
            let attribute = &edge[prefix.len()..];
            let members = self.store.set_members(&edge)?;

            match members.len() {
                0 => {}
                1 => {
                    // len checked above
                    if let Some(member) = members.iter().next() {
                        let child = self.decode_node(member, depth + 1, path)?;
                        output.insert(attribute.to_string(), Value::Object(child));
                    }
                }
                _ => {
                    let mut list = Vec::with_capacity(members.len());
                    for member in &members {
                        list.push(Value::Object(self.decode_node(member, depth + 1, path)?));
                    }
                    let name = match self.options.array_key_naming {
                        ArrayKeyNaming::EdgeKey => edge.clone(),
                        ArrayKeyNaming::Attribute => attribute.to_string(),
                    };
                    output.insert(name, Value::Array(list));
                }
            }
        }

        path.remove(key);
        Ok(output)
    }

    fn read_record(&self, key: &str) -> CodecResult<Document> {
        let mut output = Map::new();

        for (field, value) in self.store.hash_get_all(key)? {
            if field.eq_ignore_ascii_case(FINGERPRINT_FIELD) {
                continue;
            }
            if let Some(name) = field.strip_suffix(SCALAR_LIST_SUFFIX) {
                let list = parse_scalar_list(key, &field, &value)?;
                output.insert(name.to_string(), list);
                continue;
            }
            output.insert(field, coerce_field(value));
        }

        Ok(output)
    }
}

/// Integer-looking text becomes a JSON number, everything else stays a string
pub fn coerce_field(value: String) -> Value {
    match value.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(value),
    }
}

fn parse_scalar_list(key: &str, field: &str, text: &str) -> CodecResult<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(list @ Value::Array(_)) => Ok(list),
        Ok(_) => Err(CodecError::Malformed {
            key: key.to_string(),
            reason: format!("field '{}' is not a list", field),
        }),
        Err(e) => Err(CodecError::Malformed {
            key: key.to_string(),
            reason: format!("field '{}': {}", field, e),
        }),
    }
}
