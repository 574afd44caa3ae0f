//! This module holds entities that represent the schema metadata of a cluster:
//! - [Metadata] - one parsed snapshot of the schema,
//! - [Keyspace],
//!   - [Strategy] - replication strategy employed by a keyspace,
//! - [Table],
//!   - [VertexMetadata], [EdgeMetadata] - graph decorations of a table,
//! - [Column],
//! - [ColumnKind],
//! - [MaterializedView],
//! - CQL types (re-exported from keystone-cql):
//!   - [ColumnType],
//!   - [NativeType],
//!   - [UserDefinedType],
//!   - [CollectionType].
//!
//! The metadata is produced from [rows::SchemaRows] by a parser
//! obtained from [parsing::SchemaParserFactory].

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{KeyspaceStrategyError, SingleKeyspaceMetadataError};

mod cql_type;
pub mod parsing;
pub mod rows;

// Re-export of CQL types.
pub use keystone_cql::column_type::{CollectionType, ColumnType, NativeType, UserDefinedType};

pub(crate) type PerKeyspace<T> = HashMap<String, T>;
pub(crate) type PerKeyspaceResult<T, E> = PerKeyspace<Result<T, E>>;
pub(crate) type PerTable<T> = HashMap<String, T>;
pub(crate) type PerKsTable<T> = HashMap<(String, String), T>;
pub(crate) type PerKsTableResult<T, E> = PerKsTable<Result<T, E>>;

/// Describes all schema metadata retrieved from the cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Keyspaces by name. A keyspace whose metadata turned out to be inconsistent
    /// is kept as an error, without affecting the other keyspaces.
    pub keyspaces: HashMap<String, Result<Keyspace, SingleKeyspaceMetadataError>>,
}

impl Metadata {
    /// Returns the keyspace with the given name, if it was parsed successfully.
    pub fn get_keyspace(&self, name: &str) -> Option<&Keyspace> {
        self.keyspaces.get(name)?.as_ref().ok()
    }

    /// Returns the table with the given name, if its keyspace was parsed successfully.
    pub fn get_table(&self, keyspace: &str, table: &str) -> Option<&Table> {
        self.get_keyspace(keyspace)?.tables.get(table)
    }
}

/// Describes a keyspace in the cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Keyspace {
    /// Replication strategy of the keyspace.
    pub strategy: Strategy,
    /// Whether writes to the keyspace go through the commit log.
    pub durable_writes: bool,
    /// Empty HashMap may as well mean that the client restricted the keyspaces to fetch
    pub tables: HashMap<String, Table>,
    /// Empty HashMap may as well mean that the client restricted the keyspaces to fetch
    pub views: HashMap<String, MaterializedView>,
    /// Empty HashMap may as well mean that the client restricted the keyspaces to fetch
    pub user_defined_types: HashMap<String, Arc<UserDefinedType>>,
    /// Graph engine of the keyspace (e.g. `Core`), DSE only.
    ///
    /// Always `None` on servers without graph support or when graph metadata
    /// fetching is disabled in [SchemaConfig](crate::context::SchemaConfig).
    pub graph_engine: Option<String>,
}

/// Describes a table in the cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Table {
    /// Columns by name.
    pub columns: HashMap<String, Column>,
    /// Names of the column of partition key.
    /// All of the names are guaranteed to be present in `columns` field.
    pub partition_key: Vec<String>,
    /// Names of the column of clustering key.
    /// All of the names are guaranteed to be present in `columns` field.
    pub clustering_key: Vec<String>,
    /// Vertex label of the table, if the table is a graph vertex (DSE only).
    pub vertex: Option<VertexMetadata>,
    /// Edge label of the table, if the table is a graph edge (DSE only).
    pub edge: Option<EdgeMetadata>,
}

/// Describes a materialized view in the cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct MaterializedView {
    /// Columns and keys of the view.
    pub view_metadata: Table,
    /// Name of the table the view is built from.
    pub base_table_name: String,
}

/// Describes a column of the table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Column {
    /// CQL type of the column.
    pub typ: ColumnType,
    /// Role of the column in the table.
    pub kind: ColumnKind,
}

/// Role of a column in its table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColumnKind {
    /// A regular column.
    Regular,
    /// A static column, shared by all rows of a partition.
    Static,
    /// A part of the clustering key.
    Clustering,
    /// A part of the partition key.
    PartitionKey,
}

/// [ColumnKind] parse error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnKindFromStrError;

impl FromStr for ColumnKind {
    type Err = ColumnKindFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "static" => Ok(Self::Static),
            "clustering" => Ok(Self::Clustering),
            "partition_key" => Ok(Self::PartitionKey),
            _ => Err(ColumnKindFromStrError),
        }
    }
}

/// Replication strategy of a keyspace.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Strategy {
    /// Replicas placed on consecutive nodes of the ring.
    SimpleStrategy {
        /// Number of replicas.
        replication_factor: usize,
    },
    /// Replicas placed per datacenter.
    NetworkTopologyStrategy {
        /// Replication factors of datacenters with given names
        datacenter_repfactors: HashMap<String, usize>,
    },
    /// Data kept on the local node only, used by system keyspaces.
    LocalStrategy, // replication_factor == 1
    /// Any other (custom) strategy.
    Other {
        /// Class name of the strategy.
        name: String,
        /// Remaining replication options.
        data: HashMap<String, String>,
    },
}

/// Graph vertex decoration of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct VertexMetadata {
    /// Name of the vertex label.
    pub label_name: String,
}

/// Graph edge decoration of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct EdgeMetadata {
    /// Name of the edge label.
    pub label_name: String,
    /// The vertex the edge comes from.
    pub from: EdgeEndpoint,
    /// The vertex the edge goes to.
    pub to: EdgeEndpoint,
}

/// One side of an edge: the vertex table and the columns of the edge table
/// that refer to its primary key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct EdgeEndpoint {
    /// Name of the vertex table.
    pub table: String,
    /// Vertex label of that table.
    pub label: String,
    /// Columns of the edge table mapped to the vertex partition key.
    pub partition_key_columns: Vec<String>,
    /// Columns of the edge table mapped to the vertex clustering key.
    pub clustering_columns: Vec<String>,
}

impl EdgeEndpoint {
    pub(crate) fn new(
        table: String,
        label: String,
        partition_key_columns: Vec<String>,
        clustering_columns: Vec<String>,
    ) -> Self {
        Self {
            table,
            label,
            partition_key_columns,
            clustering_columns,
        }
    }
}

pub(crate) fn strategy_from_string_map(
    mut strategy_map: HashMap<String, String>,
) -> Result<Strategy, KeyspaceStrategyError> {
    let strategy_name: String = strategy_map
        .remove("class")
        .ok_or(KeyspaceStrategyError::MissingClassForStrategyDefinition)?;

    let strategy: Strategy = match strategy_name.as_str() {
        "org.apache.cassandra.locator.SimpleStrategy" | "SimpleStrategy" => {
            let rep_factor_str: String = strategy_map
                .remove("replication_factor")
                .ok_or(KeyspaceStrategyError::MissingReplicationFactorForSimpleStrategy)?;

            let replication_factor: usize = usize::from_str(&rep_factor_str)
                .map_err(KeyspaceStrategyError::ReplicationFactorParseError)?;

            Strategy::SimpleStrategy { replication_factor }
        }
        "org.apache.cassandra.locator.NetworkTopologyStrategy" | "NetworkTopologyStrategy" => {
            let mut datacenter_repfactors: HashMap<String, usize> =
                HashMap::with_capacity(strategy_map.len());

            for (key, value) in strategy_map.drain() {
                // Only 'class' (resolved above) and per-dc replication factors are expected.
                let rep_factor: usize = usize::from_str(&value).map_err(|_| {
                    KeyspaceStrategyError::UnexpectedNetworkTopologyStrategyOption {
                        key: key.clone(),
                        value,
                    }
                })?;

                datacenter_repfactors.insert(key, rep_factor);
            }

            Strategy::NetworkTopologyStrategy {
                datacenter_repfactors,
            }
        }
        "org.apache.cassandra.locator.LocalStrategy" | "LocalStrategy" => Strategy::LocalStrategy,
        _ => Strategy::Other {
            name: strategy_name,
            data: strategy_map,
        },
    };

    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::{strategy_from_string_map, ColumnKind, Strategy};
    use crate::errors::KeyspaceStrategyError;

    fn string_map<const N: usize>(entries: [(&str, &str); N]) -> HashMap<String, String> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            strategy_from_string_map(string_map([
                ("class", "org.apache.cassandra.locator.SimpleStrategy"),
                ("replication_factor", "3"),
            ]))
            .unwrap(),
            Strategy::SimpleStrategy {
                replication_factor: 3
            }
        );
        assert_eq!(
            strategy_from_string_map(string_map([
                ("class", "NetworkTopologyStrategy"),
                ("dc1", "3"),
                ("dc2", "1"),
            ]))
            .unwrap(),
            Strategy::NetworkTopologyStrategy {
                datacenter_repfactors: [("dc1".to_string(), 3), ("dc2".to_string(), 1)]
                    .into_iter()
                    .collect()
            }
        );
        assert_eq!(
            strategy_from_string_map(string_map([(
                "class",
                "org.apache.cassandra.locator.LocalStrategy"
            )]))
            .unwrap(),
            Strategy::LocalStrategy
        );
        assert_eq!(
            strategy_from_string_map(string_map([("class", "EverywhereStrategy"), ("a", "b")]))
                .unwrap(),
            Strategy::Other {
                name: "EverywhereStrategy".to_string(),
                data: string_map([("a", "b")]),
            }
        );
    }

    #[test]
    fn test_invalid_strategies() {
        assert_matches!(
            strategy_from_string_map(string_map([("replication_factor", "3")])),
            Err(KeyspaceStrategyError::MissingClassForStrategyDefinition)
        );
        assert_matches!(
            strategy_from_string_map(string_map([("class", "SimpleStrategy")])),
            Err(KeyspaceStrategyError::MissingReplicationFactorForSimpleStrategy)
        );
        assert_matches!(
            strategy_from_string_map(string_map([
                ("class", "SimpleStrategy"),
                ("replication_factor", "three"),
            ])),
            Err(KeyspaceStrategyError::ReplicationFactorParseError(_))
        );
        assert_matches!(
            strategy_from_string_map(string_map([
                ("class", "NetworkTopologyStrategy"),
                ("dc1", "x"),
            ])),
            Err(KeyspaceStrategyError::UnexpectedNetworkTopologyStrategyOption { key, value })
                if key == "dc1" && value == "x"
        );
    }

    #[test]
    fn test_column_kind_from_str() {
        assert_eq!("regular".parse(), Ok(ColumnKind::Regular));
        assert_eq!("static".parse(), Ok(ColumnKind::Static));
        assert_eq!("clustering".parse(), Ok(ColumnKind::Clustering));
        assert_eq!("partition_key".parse(), Ok(ColumnKind::PartitionKey));
        assert!("compact_value".parse::<ColumnKind>().is_err());
    }
}
