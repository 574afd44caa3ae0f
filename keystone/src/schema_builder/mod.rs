//! Fragments of schema-altering statements.
//!
//! The types here only render CQL text, they do not execute anything.
//! Identifiers are rendered in their quoted-if-needed form, see
//! [CqlIdentifier::as_cql](keystone_cql::identifier::CqlIdentifier::as_cql).

pub mod graph;

pub use graph::{
    AlterTableGraph, EdgeLabelOperation, EdgeSide, GraphLabelOperation, GraphOperationKind,
    VertexLabelOperation,
};
