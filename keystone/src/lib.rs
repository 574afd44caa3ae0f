//! Driver core for CQL databases: the node model, flavor-aware parsing of
//! schema metadata and publication of refreshed schema snapshots.
//! Works with [Apache Cassandra®](https://cassandra.apache.org/) and
//! DataStax Enterprise.
//!
//! Value encoding and decoding lives in the [keystone-cql](keystone_cql) crate,
//! re-exported here as [codec].
//!
//! # Overview
//! ### Parsing schema
//! Schema rows read from the `system_schema` tables of one node are gathered
//! in [SchemaRows](cluster::metadata::rows::SchemaRows). A
//! [SchemaParserFactory](cluster::metadata::parsing::SchemaParserFactory) picks
//! the parser matching the server flavor of that node:
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::net::{Ipv4Addr, SocketAddr};
//! use std::sync::Arc;
//!
//! use keystone::cluster::metadata::parsing::{SchemaParserFactory, ServerFlavor};
//! use keystone::cluster::metadata::rows::{SchemaRow, SchemaRows, SchemaSection};
//! use keystone::cluster::Node;
//! use keystone::context::{DriverContext, SchemaConfig};
//! # use std::error::Error;
//! # fn check() -> Result<(), Box<dyn Error>> {
//!
//! let node = Node::new(uuid::Uuid::nil(), SocketAddr::from((Ipv4Addr::LOCALHOST, 9042)));
//! let rows = SchemaRows::builder(Arc::new(node))
//!     .row(
//!         SchemaSection::Keyspaces,
//!         SchemaRow::new()
//!             .with("keyspace_name", "ks")
//!             .with("replication", BTreeMap::from([("class", "LocalStrategy")])),
//!     )
//!     .build();
//!
//! let factory = SchemaParserFactory::new(DriverContext::shared(SchemaConfig::default()));
//! let parser = factory.new_instance(rows);
//! assert_eq!(parser.flavor(), ServerFlavor::Cassandra);
//!
//! let metadata = parser.parse()?;
//! assert!(metadata.get_keyspace("ks").is_some());
//! # Ok(())
//! # }
//! # check().unwrap();
//! ```
//!
//! ### Keeping schema up to date
//! [SchemaRefresher](cluster::SchemaRefresher) parses each new snapshot and
//! publishes it atomically. A failed parse leaves the previous metadata in place.
//!
//! ### Altering schema
//! The [schema_builder] module renders graph label clauses of `ALTER TABLE`
//! statements.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

/// Codecs converting between Rust values and CQL wire bytes and literals.
pub mod codec {
    pub use keystone_cql::codec::*;
}

pub use keystone_cql::identifier::CqlIdentifier;
pub use keystone_cql::value::CqlValue;

pub mod cluster;
pub mod context;
pub mod errors;
pub mod schema_builder;

pub(crate) mod utils;

pub use cluster::metadata::parsing::{SchemaParser, SchemaParserFactory, ServerFlavor};
pub use cluster::SchemaRefresher;
pub use context::{DriverContext, SchemaConfig};
