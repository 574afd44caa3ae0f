//! This module holds entities that represent the cluster as seen by the schema layer:
//! - node's representation ([Node]), together with the extra properties
//!   reported by the server,
//! - [metadata] representation and parsing, including:
//!   - raw schema rows ([metadata::rows]),
//!   - flavor-aware parsers ([metadata::parsing]),
//! - [SchemaRefresher], which publishes parsed metadata atomically
//!   upon a refresh, so that readers never observe a half-updated schema.

pub mod metadata;

pub mod node;
pub use node::{Node, NodeExtras, NodeRef};

mod refresh;
pub use refresh::SchemaRefresher;
