//! docgraph - nested documents over a hash/set key-value store
//!
//! Documents are decomposed into one hash record per object plus one set
//! per nested attribute, and rebuilt by walking those sets from a root key.

pub mod cli;
pub mod codec;
pub mod observability;
pub mod service;
pub mod store;
