//! Document/graph codec
//!
//! A document is a tree of objects, each carrying `objectType` and
//! `objectId`. The codec flattens it into a hash/set key space:
//!
//! | Key | Kind | Contents |
//! |---|---|---|
//! | `type_id` | hash | scalar attributes, `name[]` scalar lists, `eTag` on roots |
//! | `type_id_attr` | set | NodeKeys of the children under `attr` |
//!
//! # Components
//!
//! - [`Node`]: parse + validate a JSON document before any write
//! - [`Encoder`]: write records and edge sets
//! - [`Decoder`]: rebuild a document from a root key
//! - [`DeletionWalker`]: remove everything reachable from a root key
//! - [`Fingerprinter`]: version tokens
//!
//! None of these group their store calls into a transaction. A failure
//! partway through a save or delete leaves whatever was already written.

mod decoder;
mod encoder;
mod errors;
mod fingerprint;
mod node;
mod options;
mod walker;

pub use decoder::{coerce_field, Decoder, Document};
pub use encoder::{EncodeReport, Encoder};
pub use errors::{CodecError, CodecResult};
pub use fingerprint::{content_fingerprint, identity_fingerprint, Fingerprinter};
pub use node::{
    Attribute, Node, NodeKey, Scalar, FINGERPRINT_FIELD, KEY_SEPARATOR, OBJECT_ID, OBJECT_TYPE,
    SCALAR_LIST_SUFFIX,
};
pub use options::{ArrayKeyNaming, CodecOptions, FingerprintMode, DEFAULT_MAX_DEPTH};
pub use walker::{DeleteReport, DeletionWalker};
