use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::super::rows::{SchemaRow, SchemaRows, SchemaSection};
use super::super::{EdgeEndpoint, EdgeMetadata, Metadata, Table, VertexMetadata};
use super::CassandraSchemaParser;
use crate::context::DriverContext;
use crate::errors::{SchemaParseError, SchemaRowError};

/// Parser of the schema tables of DataStax Enterprise.
///
/// Parses everything [CassandraSchemaParser] does, then decorates the result
/// with graph metadata: the graph engine of keyspaces, and vertex and edge
/// labels of tables. Graph metadata is read only if enabled with
/// [SchemaConfig::fetch_graph_metadata](crate::context::SchemaConfig::fetch_graph_metadata).
///
/// Graph rows are never fatal: a row that cannot be interpreted, or that
/// refers to an unknown table, is skipped with a warning.
#[derive(Debug)]
pub struct DseSchemaParser {
    base: CassandraSchemaParser,
}

impl DseSchemaParser {
    /// Creates a parser of `rows`.
    pub fn new(rows: SchemaRows, context: Arc<DriverContext>) -> Self {
        Self {
            base: CassandraSchemaParser::new(rows, context),
        }
    }

    /// The rows to be parsed.
    pub fn rows(&self) -> &SchemaRows {
        self.base.rows()
    }

    /// The context the parser was created with.
    pub fn context(&self) -> &Arc<DriverContext> {
        self.base.context()
    }

    /// Parses the rows into schema metadata, graph metadata included.
    pub fn parse(self) -> Result<Metadata, SchemaParseError> {
        let mut metadata = self.base.parse_base()?;

        if !self.context().schema_config().get_fetch_graph_metadata() {
            debug!("Graph metadata disabled, skipping graph sections");
            return Ok(metadata);
        }

        self.apply_graph_engines(&mut metadata);
        self.apply_vertices(&mut metadata);
        self.apply_edges(&mut metadata);

        Ok(metadata)
    }

    fn graph_rows(&self, section: SchemaSection) -> impl Iterator<Item = &SchemaRow> {
        let config = self.context().schema_config();
        self.rows().rows(section).iter().filter(move |row| {
            // Rows without a keyspace name are reported when parsed.
            row.get_string("keyspace_name")
                .map_or(true, |keyspace_name| config.should_fetch_keyspace(keyspace_name))
        })
    }

    fn apply_graph_engines(&self, metadata: &mut Metadata) {
        let section = SchemaSection::Keyspaces;
        for row in self.graph_rows(section) {
            // Core rows were validated by the base parser.
            let Ok(keyspace_name) = row.get_string("keyspace_name") else {
                continue;
            };
            let graph_engine = match row.get_opt_string("graph_engine") {
                Ok(graph_engine) => graph_engine,
                Err(error) => {
                    warn!(
                        %section,
                        keyspace = keyspace_name,
                        %error,
                        value = ?row.get("graph_engine"),
                        "Ignoring graph engine"
                    );
                    continue;
                }
            };
            if let Some(Ok(keyspace)) = metadata.keyspaces.get_mut(keyspace_name) {
                keyspace.graph_engine = graph_engine.map(str::to_owned);
            }
        }
    }

    fn apply_vertices(&self, metadata: &mut Metadata) {
        let section = SchemaSection::Vertices;
        for row in self.graph_rows(section) {
            match read_vertex_row(row) {
                Ok((keyspace_name, table_name, vertex)) => {
                    let Some(table) = find_table(metadata, keyspace_name, table_name) else {
                        warn!(
                            %section,
                            keyspace = keyspace_name,
                            table = table_name,
                            "Skipping graph row of an unknown table"
                        );
                        continue;
                    };
                    trace!(
                        keyspace = keyspace_name,
                        table = table_name,
                        label = %vertex.label_name,
                        "Applying vertex label"
                    );
                    table.vertex = Some(vertex);
                }
                Err(error) => warn!(%section, %error, "Skipping unrecognized graph row"),
            }
        }
    }

    fn apply_edges(&self, metadata: &mut Metadata) {
        let section = SchemaSection::Edges;
        for row in self.graph_rows(section) {
            match read_edge_row(row) {
                Ok((keyspace_name, table_name, edge)) => {
                    let Some(table) = find_table(metadata, keyspace_name, table_name) else {
                        warn!(
                            %section,
                            keyspace = keyspace_name,
                            table = table_name,
                            "Skipping graph row of an unknown table"
                        );
                        continue;
                    };
                    trace!(
                        keyspace = keyspace_name,
                        table = table_name,
                        label = %edge.label_name,
                        "Applying edge label"
                    );
                    table.edge = Some(edge);
                }
                Err(error) => warn!(%section, %error, "Skipping unrecognized graph row"),
            }
        }
    }
}

/// Table of a keyspace that was parsed successfully.
fn find_table<'a>(
    metadata: &'a mut Metadata,
    keyspace_name: &str,
    table_name: &str,
) -> Option<&'a mut Table> {
    metadata
        .keyspaces
        .get_mut(keyspace_name)?
        .as_mut()
        .ok()?
        .tables
        .get_mut(table_name)
}

fn read_vertex_row(row: &SchemaRow) -> Result<(&str, &str, VertexMetadata), SchemaRowError> {
    Ok((
        row.get_string("keyspace_name")?,
        row.get_string("table_name")?,
        VertexMetadata {
            label_name: row.get_string("label_name")?.to_owned(),
        },
    ))
}

fn read_edge_row(row: &SchemaRow) -> Result<(&str, &str, EdgeMetadata), SchemaRowError> {
    let endpoint = |table, label, partition_key_columns, clustering_columns| {
        Ok::<_, SchemaRowError>(EdgeEndpoint::new(
            row.get_string(table)?.to_owned(),
            row.get_string(label)?.to_owned(),
            row.get_string_list(partition_key_columns)?,
            row.get_string_list(clustering_columns)?,
        ))
    };

    Ok((
        row.get_string("keyspace_name")?,
        row.get_string("table_name")?,
        EdgeMetadata {
            label_name: row.get_string("label_name")?.to_owned(),
            from: endpoint(
                "from_table",
                "from_label",
                "from_partition_key_columns",
                "from_clustering_columns",
            )?,
            to: endpoint(
                "to_table",
                "to_label",
                "to_partition_key_columns",
                "to_clustering_columns",
            )?,
        },
    ))
}
