//! Typed document tree
//!
//! A JSON document is parsed and validated into a [`Node`] tree before a
//! single store write happens, so a malformed object anywhere in the tree
//! fails the whole save.

use std::fmt;

use serde_json::{Map, Number, Value};

use super::errors::{CodecError, CodecResult};

/// Identity field naming the node's type
pub const OBJECT_TYPE: &str = "objectType";
/// Identity field naming the node's instance
pub const OBJECT_ID: &str = "objectId";
/// Record field holding the version token of a root node
pub const FINGERPRINT_FIELD: &str = "eTag";
/// Suffix marking a record field that holds a JSON list of scalars
pub const SCALAR_LIST_SUFFIX: &str = "[]";
/// Joins identity parts and edge attribute names in key strings
pub const KEY_SEPARATOR: &str = "_";

/// Store address of a node record: `objectType_objectId`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(object_type: &str, object_id: &str) -> Self {
        NodeKey(format!("{}{}{}", object_type, KEY_SEPARATOR, object_id))
    }

    /// Key named by a document's identity fields, without validating the
    /// rest of it
    pub fn of_document(document: &Value) -> Option<Self> {
        let object = document.as_object()?;
        let object_type = object.get(OBJECT_TYPE)?.as_str()?;
        let object_id = object.get(OBJECT_ID)?.as_str()?;
        Some(NodeKey::new(object_type, object_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the edge set for `attribute` on this node
    pub fn edge_key(&self, attribute: &str) -> String {
        edge_key(&self.0, attribute)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn edge_key(node_key: &str, attribute: &str) -> String {
    format!("{}{}{}", node_key, KEY_SEPARATOR, attribute)
}

pub(crate) fn edge_prefix(node_key: &str) -> String {
    format!("{}{}", node_key, KEY_SEPARATOR)
}

/// A leaf value stored as one record field
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl Scalar {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Scalar::Str(s.clone())),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Null => Some(Scalar::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Text written into the record field
    pub fn to_field_text(&self) -> String {
        match self {
            Scalar::Str(s) => s.clone(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Null => "null".to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Str(s) => Value::String(s.clone()),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Null => Value::Null,
        }
    }
}

/// The value of one named attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Stored as a field of the owning record
    Scalar(Scalar),
    /// Stored as its own record, linked by a one-member edge set
    Object(Node),
    /// Stored as one record per element, linked by a shared edge set
    Array(Vec<Node>),
    /// Stored as a JSON list in the `name[]` field of the owning record
    ScalarList(Vec<Scalar>),
}

/// One object of a document: its identity plus named attributes in
/// document order
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    key: NodeKey,
    attributes: Vec<(String, Attribute)>,
}

impl Node {
    /// Parses and validates a whole document.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Validation` if any object lacks a string
    /// `objectType`/`objectId`, has an identity value containing the key
    /// separator, uses a reserved attribute name, or holds an
    /// array that is neither all objects nor all scalars. Returns
    /// `CodecError::DepthExceeded` if objects nest deeper than `max_depth`.
    pub fn parse(document: &Value, max_depth: usize) -> CodecResult<Node> {
        Self::parse_value(document, "$", 1, max_depth)
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn attributes(&self) -> &[(String, Attribute)] {
        &self.attributes
    }

    fn parse_value(value: &Value, path: &str, depth: usize, max_depth: usize) -> CodecResult<Node> {
        let object = value
            .as_object()
            .ok_or_else(|| CodecError::validation(path, "expected an object"))?;

        if depth > max_depth {
            return Err(CodecError::DepthExceeded {
                key: path.to_string(),
                max_depth,
            });
        }

        let key = NodeKey::new(
            identity_field(object, OBJECT_TYPE, path)?,
            identity_field(object, OBJECT_ID, path)?,
        );

        let mut attributes = Vec::with_capacity(object.len().saturating_sub(2));
        for (name, value) in object {
            if name == OBJECT_TYPE || name == OBJECT_ID {
                continue;
            }
            let attr_path = format!("{}.{}", path, name);
            check_attribute_name(name, &attr_path)?;

            let attribute = match value {
                Value::Object(_) => {
                    Attribute::Object(Self::parse_value(value, &attr_path, depth + 1, max_depth)?)
                }
                Value::Array(items) => Self::parse_array(items, &attr_path, depth, max_depth)?,
                scalar => match Scalar::from_json(scalar) {
                    Some(s) => Attribute::Scalar(s),
                    None => return Err(CodecError::validation(&attr_path, "unsupported value")),
                },
            };
            attributes.push((name.clone(), attribute));
        }

        Ok(Node { key, attributes })
    }

    fn parse_array(
        items: &[Value],
        path: &str,
        depth: usize,
        max_depth: usize,
    ) -> CodecResult<Attribute> {
        if items.iter().all(Value::is_object) && !items.is_empty() {
            let nodes = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Self::parse_value(item, &format!("{}[{}]", path, i), depth + 1, max_depth)
                })
                .collect::<CodecResult<Vec<_>>>()?;
            return Ok(Attribute::Array(nodes));
        }

        let mut scalars = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match Scalar::from_json(item) {
                Some(s) => scalars.push(s),
                None => {
                    return Err(CodecError::validation(
                        format!("{}[{}]", path, i),
                        "arrays must hold only objects or only scalars",
                    ))
                }
            }
        }
        Ok(Attribute::ScalarList(scalars))
    }
}

fn identity_field<'a>(
    object: &'a Map<String, Value>,
    name: &str,
    path: &str,
) -> CodecResult<&'a str> {
    match object.get(name) {
        None => Err(CodecError::validation(
            path,
            format!("missing identity field '{}'", name),
        )),
        Some(Value::String(s)) if s.contains(KEY_SEPARATOR) => Err(CodecError::validation(
            path,
            format!("identity field '{}' may not contain '{}'", name, KEY_SEPARATOR),
        )),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        Some(_) => Err(CodecError::validation(
            path,
            format!("identity field '{}' must be a non-empty string", name),
        )),
    }
}

fn check_attribute_name(name: &str, path: &str) -> CodecResult<()> {
    if name.eq_ignore_ascii_case(FINGERPRINT_FIELD) {
        return Err(CodecError::validation(
            path,
            format!("'{}' is reserved for the version token", FINGERPRINT_FIELD),
        ));
    }
    if name.ends_with(SCALAR_LIST_SUFFIX) {
        return Err(CodecError::validation(
            path,
            format!("attribute names may not end with '{}'", SCALAR_LIST_SUFFIX),
        ));
    }
    Ok(())
}
