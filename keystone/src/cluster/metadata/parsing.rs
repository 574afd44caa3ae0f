//! Selection of the schema parser matching the flavor of the server.
//!
//! Schema tables differ between server flavors: DataStax Enterprise adds graph
//! metadata on top of the layout of Apache Cassandra. [SchemaParserFactory]
//! looks at the node the rows were read from and hands out a [SchemaParser]
//! of the right variant. Every refresh gets its own parser.

use std::sync::Arc;

use tracing::{debug, debug_span};

use super::rows::SchemaRows;
use super::Metadata;
use crate::cluster::node::{node_properties, NodeExtras};
use crate::context::DriverContext;
use crate::errors::SchemaParseError;

mod cassandra;
mod dse;

pub use cassandra::CassandraSchemaParser;
pub use dse::DseSchemaParser;

/// Dialect of the schema tables of a server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServerFlavor {
    /// Apache Cassandra, or any server using its schema layout.
    Cassandra,
    /// DataStax Enterprise.
    Dse,
}

impl ServerFlavor {
    /// Classifies a node by its extra properties: a node reporting
    /// [node_properties::DSE_VERSION] runs DSE, any other runs Cassandra.
    pub fn detect(extras: &NodeExtras) -> Self {
        if extras.contains_key(node_properties::DSE_VERSION) {
            ServerFlavor::Dse
        } else {
            ServerFlavor::Cassandra
        }
    }
}

/// Creates schema parsers for snapshots of schema rows.
///
/// The factory is stateless apart from the shared [DriverContext], which is
/// passed unchanged to every parser it creates. It can be used concurrently.
#[derive(Clone, Debug)]
pub struct SchemaParserFactory {
    context: Arc<DriverContext>,
}

impl SchemaParserFactory {
    /// Creates a factory whose parsers will use `context`.
    pub fn new(context: Arc<DriverContext>) -> Self {
        Self { context }
    }

    /// The context passed to created parsers.
    pub fn context(&self) -> &Arc<DriverContext> {
        &self.context
    }

    /// Creates a parser for `rows`, choosing its variant by the flavor of the
    /// node the rows come from. The content of the rows does not matter.
    pub fn new_instance(&self, rows: SchemaRows) -> SchemaParser {
        let flavor = ServerFlavor::detect(&rows.node().extras);
        debug!(
            session = self.context.log_name(),
            node = %rows.node(),
            ?flavor,
            "Creating schema parser"
        );
        let context = self.context.clone();
        match flavor {
            ServerFlavor::Cassandra => {
                SchemaParser::Cassandra(CassandraSchemaParser::new(rows, context))
            }
            ServerFlavor::Dse => SchemaParser::Dse(DseSchemaParser::new(rows, context)),
        }
    }
}

/// A parser of one snapshot of schema rows.
///
/// Parsing consumes the parser.
#[derive(Debug)]
pub enum SchemaParser {
    /// Parser of the Cassandra schema layout.
    Cassandra(CassandraSchemaParser),
    /// Parser of the DSE schema layout, adds graph metadata.
    Dse(DseSchemaParser),
}

impl SchemaParser {
    /// The flavor this parser handles.
    pub fn flavor(&self) -> ServerFlavor {
        match self {
            SchemaParser::Cassandra(_) => ServerFlavor::Cassandra,
            SchemaParser::Dse(_) => ServerFlavor::Dse,
        }
    }

    /// The rows to be parsed.
    pub fn rows(&self) -> &SchemaRows {
        match self {
            SchemaParser::Cassandra(parser) => parser.rows(),
            SchemaParser::Dse(parser) => parser.rows(),
        }
    }

    /// The context the parser was created with.
    pub fn context(&self) -> &Arc<DriverContext> {
        match self {
            SchemaParser::Cassandra(parser) => parser.context(),
            SchemaParser::Dse(parser) => parser.context(),
        }
    }

    /// Parses the rows into schema metadata.
    ///
    /// Fails as a whole only if a core row cannot be interpreted. Problems
    /// local to a keyspace are stored in [Metadata::keyspaces] instead.
    pub fn parse(self) -> Result<Metadata, SchemaParseError> {
        let span = debug_span!(
            "schema_parse",
            session = self.context().log_name(),
            flavor = ?self.flavor()
        );
        let _enter = span.enter();

        let result = match self {
            SchemaParser::Cassandra(parser) => parser.parse(),
            SchemaParser::Dse(parser) => parser.parse(),
        };
        if let Ok(metadata) = &result {
            debug!(
                keyspaces = metadata.keyspaces.len(),
                failed_keyspaces = metadata.keyspaces.values().filter(|ks| ks.is_err()).count(),
                "Parsed schema metadata"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests;
