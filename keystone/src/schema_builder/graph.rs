//! Graph label clauses of `ALTER TABLE` statements (DSE only).
//!
//! ```
//! use keystone::schema_builder::{AlterTableGraph, GraphOperationKind, VertexLabelOperation};
//!
//! let vertex = VertexLabelOperation::new(GraphOperationKind::Add, Some("person".into()));
//! assert_eq!(vertex.render(), "VERTEX LABEL person");
//!
//! let statement = AlterTableGraph::new(Some("ks".into()), "people".into(), vertex.into());
//! assert_eq!(statement.render(), "ALTER TABLE ks.people WITH VERTEX LABEL person");
//! ```

use std::fmt::{self, Display, Write};

use itertools::Itertools;
use keystone_cql::identifier::CqlIdentifier;

/// Whether a label is added to a table or removed from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphOperationKind {
    /// Rendered as `WITH`.
    Add,
    /// Rendered as `WITHOUT`.
    Drop,
}

impl GraphOperationKind {
    /// The keyword introducing the label clause.
    pub fn keyword(self) -> &'static str {
        match self {
            GraphOperationKind::Add => "WITH",
            GraphOperationKind::Drop => "WITHOUT",
        }
    }
}

/// The `VERTEX LABEL [label]` clause.
///
/// The label may be omitted, in which case the server names it after the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexLabelOperation {
    kind: GraphOperationKind,
    label: Option<CqlIdentifier>,
}

impl VertexLabelOperation {
    /// Creates the clause.
    pub fn new(kind: GraphOperationKind, label: Option<CqlIdentifier>) -> Self {
        Self { kind, label }
    }

    /// Whether the label is added or removed.
    pub fn kind(&self) -> GraphOperationKind {
        self.kind
    }

    /// The label, if given.
    pub fn label(&self) -> Option<&CqlIdentifier> {
        self.label.as_ref()
    }

    /// Renders the clause, without the leading `WITH`/`WITHOUT`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for VertexLabelOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VERTEX LABEL")?;
        if let Some(label) = &self.label {
            write!(f, " {}", label.as_cql(true))?;
        }
        Ok(())
    }
}

/// One side of an edge: a vertex table and the columns of the edge table
/// mapped to its primary key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeSide {
    table: CqlIdentifier,
    partition_key_columns: Vec<CqlIdentifier>,
    clustering_columns: Vec<CqlIdentifier>,
}

impl EdgeSide {
    /// A side with no columns yet.
    pub fn new(table: CqlIdentifier) -> Self {
        Self {
            table,
            partition_key_columns: Vec::new(),
            clustering_columns: Vec::new(),
        }
    }

    /// Appends a column mapped to the partition key of the vertex.
    pub fn partition_key(mut self, column: impl Into<CqlIdentifier>) -> Self {
        self.partition_key_columns.push(column.into());
        self
    }

    /// Appends a column mapped to the clustering key of the vertex.
    pub fn clustering_column(mut self, column: impl Into<CqlIdentifier>) -> Self {
        self.clustering_columns.push(column.into());
        self
    }
}

impl Display for EdgeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |columns: &[CqlIdentifier]| columns.iter().map(|c| c.as_cql(true)).join(", ");

        write!(f, "{}(", self.table.as_cql(true))?;
        // A composite partition key is parenthesized.
        if self.partition_key_columns.len() == 1 {
            f.write_str(&render(&self.partition_key_columns))?;
        } else {
            write!(f, "({})", render(&self.partition_key_columns))?;
        }
        for column in &self.clustering_columns {
            write!(f, ", {}", column.as_cql(true))?;
        }
        f.write_char(')')
    }
}

/// The `EDGE LABEL [label] [FROM side TO side]` clause.
///
/// Adding an edge label needs both sides, dropping one needs none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeLabelOperation {
    kind: GraphOperationKind,
    label: Option<CqlIdentifier>,
    sides: Option<(EdgeSide, EdgeSide)>,
}

impl EdgeLabelOperation {
    /// Clause adding an edge label going from `from` to `to`.
    pub fn add(label: Option<CqlIdentifier>, from: EdgeSide, to: EdgeSide) -> Self {
        Self {
            kind: GraphOperationKind::Add,
            label,
            sides: Some((from, to)),
        }
    }

    /// Clause removing an edge label.
    pub fn drop(label: Option<CqlIdentifier>) -> Self {
        Self {
            kind: GraphOperationKind::Drop,
            label,
            sides: None,
        }
    }

    /// Whether the label is added or removed.
    pub fn kind(&self) -> GraphOperationKind {
        self.kind
    }

    /// The label, if given.
    pub fn label(&self) -> Option<&CqlIdentifier> {
        self.label.as_ref()
    }

    /// Renders the clause, without the leading `WITH`/`WITHOUT`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for EdgeLabelOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EDGE LABEL")?;
        if let Some(label) = &self.label {
            write!(f, " {}", label.as_cql(true))?;
        }
        if let Some((from, to)) = &self.sides {
            write!(f, " FROM {from} TO {to}")?;
        }
        Ok(())
    }
}

/// A vertex or an edge label clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphLabelOperation {
    /// `VERTEX LABEL ...`
    Vertex(VertexLabelOperation),
    /// `EDGE LABEL ...`
    Edge(EdgeLabelOperation),
}

impl GraphLabelOperation {
    /// Whether the label is added or removed.
    pub fn kind(&self) -> GraphOperationKind {
        match self {
            GraphLabelOperation::Vertex(op) => op.kind(),
            GraphLabelOperation::Edge(op) => op.kind(),
        }
    }
}

impl From<VertexLabelOperation> for GraphLabelOperation {
    fn from(op: VertexLabelOperation) -> Self {
        GraphLabelOperation::Vertex(op)
    }
}

impl From<EdgeLabelOperation> for GraphLabelOperation {
    fn from(op: EdgeLabelOperation) -> Self {
        GraphLabelOperation::Edge(op)
    }
}

impl Display for GraphLabelOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphLabelOperation::Vertex(op) => op.fmt(f),
            GraphLabelOperation::Edge(op) => op.fmt(f),
        }
    }
}

/// `ALTER TABLE [keyspace.]table WITH|WITHOUT <label clause>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlterTableGraph {
    keyspace: Option<CqlIdentifier>,
    table: CqlIdentifier,
    operation: GraphLabelOperation,
}

impl AlterTableGraph {
    /// Creates the statement.
    pub fn new(
        keyspace: Option<CqlIdentifier>,
        table: CqlIdentifier,
        operation: GraphLabelOperation,
    ) -> Self {
        Self {
            keyspace,
            table,
            operation,
        }
    }

    /// The label clause.
    pub fn operation(&self) -> &GraphLabelOperation {
        &self.operation
    }

    /// Renders the whole statement.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for AlterTableGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ALTER TABLE ")?;
        if let Some(keyspace) = &self.keyspace {
            write!(f, "{}.", keyspace.as_cql(true))?;
        }
        write!(
            f,
            "{} {} {}",
            self.table.as_cql(true),
            self.operation.kind().keyword(),
            self.operation
        )
    }
}
