//! Definitions of errors returned by the schema layer of the driver.

use std::num::ParseIntError;

use thiserror::Error;

use crate::cluster::metadata::rows::SchemaSection;

/// Failure of a whole schema parse.
///
/// Returned by [SchemaParser::parse](crate::cluster::metadata::parsing::SchemaParser::parse)
/// when the rows of a schema snapshot cannot be interpreted at all. When this
/// happens during a refresh, the previously published metadata stays in place.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum SchemaParseError {
    /// A row of one of the core sections lacks a column or holds a value of an unexpected type.
    #[error("Invalid row in {section} section: {error}")]
    InvalidRow {
        /// Section that contains the row.
        section: SchemaSection,
        /// What is wrong with the row.
        error: SchemaRowError,
    },

    /// A column type or a field type of a user defined type could not be parsed.
    #[error("Invalid CQL type {typ:?} at position {position}: {reason}")]
    InvalidCqlType {
        /// Type string as returned by the server.
        typ: String,
        /// 1-based position of the offending character.
        position: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A column row has a kind this driver does not know.
    #[error(
        "Unknown column kind '{column_kind}' for {keyspace_name}.{table_name}.{column_name}"
    )]
    UnknownColumnKind {
        /// Keyspace of the column.
        keyspace_name: String,
        /// Table of the column.
        table_name: String,
        /// Name of the column.
        column_name: String,
        /// The unrecognized kind.
        column_kind: String,
    },

    /// User defined types refer to each other in a cycle.
    #[error("Detected circular dependency between user defined types - toposort is impossible!")]
    CircularTypeDependency,
}

/// Describes what is wrong with a single row of a schema section.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaRowError {
    /// The row has no value for a required column.
    #[error("missing value of column '{column}'")]
    MissingColumn {
        /// Name of the column.
        column: &'static str,
    },

    /// The value of a column is not of the expected type.
    #[error("column '{column}' has unexpected type, expected {expected}")]
    UnexpectedType {
        /// Name of the column.
        column: &'static str,
        /// Description of the expected type.
        expected: &'static str,
    },
}

/// Indicates that reading metadata failed, but in a way
/// that we can handle, by throwing out data for a keyspace.
///
/// Other keyspaces of the same snapshot are not affected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SingleKeyspaceMetadataError {
    /// A column or a user defined type refers to an undefined type.
    #[error(transparent)]
    MissingUDT(#[from] MissingUserDefinedType),
    /// A column of the partition key is missing.
    #[error("Partition key column with position {0} is missing from metadata")]
    IncompletePartitionKey(i32),
    /// A column of the clustering key is missing.
    #[error("Clustering key column with position {0} is missing from metadata")]
    IncompleteClusteringKey(i32),
    /// The replication options of the keyspace are invalid.
    #[error("Invalid replication strategy: {0}")]
    Strategy(#[from] KeyspaceStrategyError),
}

/// Represents a user defined type whose definition is missing from the metadata.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Missing UDT: {keyspace}, {name}")]
pub struct MissingUserDefinedType {
    /// Name of the missing type.
    pub name: String,
    /// Keyspace the type was looked up in.
    pub keyspace: String,
}

/// An error that occurred during parsing of the replication options of a keyspace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyspaceStrategyError {
    /// The replication map has no `class` entry.
    #[error("keyspace strategy definition is missing a 'class' field")]
    MissingClassForStrategyDefinition,

    /// `SimpleStrategy` without a replication factor.
    #[error("Missing replication factor field for SimpleStrategy")]
    MissingReplicationFactorForSimpleStrategy,

    /// The replication factor is not a valid number.
    #[error("Failed to parse a replication factor as unsigned integer: {0}")]
    ReplicationFactorParseError(ParseIntError),

    /// `NetworkTopologyStrategy` option that is not a per-datacenter replication factor.
    #[error("Unexpected NetworkTopologyStrategy option: '{key}': '{value}'")]
    UnexpectedNetworkTopologyStrategyOption {
        /// Option name.
        key: String,
        /// Option value.
        value: String,
    },
}
