//! Raw rows of the schema tables, as handed over to a schema parser.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use keystone_cql::value::CqlValue;

use crate::cluster::node::Node;
use crate::errors::SchemaRowError;

/// A group of schema rows, corresponding to one `system_schema` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SchemaSection {
    /// `system_schema.keyspaces`
    Keyspaces,
    /// `system_schema.tables`
    Tables,
    /// `system_schema.views`
    Views,
    /// `system_schema.columns`
    Columns,
    /// `system_schema.types`
    Types,
    /// `system_schema.vertices`, DSE only.
    Vertices,
    /// `system_schema.edges`, DSE only.
    Edges,
}

impl SchemaSection {
    /// Name of the schema table the rows come from.
    pub fn table_name(self) -> &'static str {
        match self {
            SchemaSection::Keyspaces => "system_schema.keyspaces",
            SchemaSection::Tables => "system_schema.tables",
            SchemaSection::Views => "system_schema.views",
            SchemaSection::Columns => "system_schema.columns",
            SchemaSection::Types => "system_schema.types",
            SchemaSection::Vertices => "system_schema.vertices",
            SchemaSection::Edges => "system_schema.edges",
        }
    }
}

impl fmt::Display for SchemaSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A single row of a schema table: values by column name.
///
/// A column holding null is simply absent from the row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaRow {
    values: HashMap<String, CqlValue>,
}

impl SchemaRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a column.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CqlValue>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Returns the value of a column, `None` if the column is absent or null.
    pub fn get(&self, column: &str) -> Option<&CqlValue> {
        self.values.get(column)
    }

    fn get_required(&self, column: &'static str) -> Result<&CqlValue, SchemaRowError> {
        self.get(column)
            .ok_or(SchemaRowError::MissingColumn { column })
    }

    pub(crate) fn get_string(&self, column: &'static str) -> Result<&str, SchemaRowError> {
        self.get_required(column)?
            .as_str()
            .ok_or(SchemaRowError::UnexpectedType {
                column,
                expected: "text",
            })
    }

    pub(crate) fn get_opt_string(
        &self,
        column: &'static str,
    ) -> Result<Option<&str>, SchemaRowError> {
        self.get(column)
            .map(|value| {
                value.as_str().ok_or(SchemaRowError::UnexpectedType {
                    column,
                    expected: "text",
                })
            })
            .transpose()
    }

    pub(crate) fn get_int(&self, column: &'static str) -> Result<i32, SchemaRowError> {
        self.get_required(column)?
            .as_int()
            .ok_or(SchemaRowError::UnexpectedType {
                column,
                expected: "int",
            })
    }

    pub(crate) fn get_opt_bool(&self, column: &'static str) -> Result<Option<bool>, SchemaRowError> {
        self.get(column)
            .map(|value| {
                value.as_boolean().ok_or(SchemaRowError::UnexpectedType {
                    column,
                    expected: "boolean",
                })
            })
            .transpose()
    }

    /// Reads a `list<text>` (or `frozen<list<text>>`) column. Null reads as an empty list.
    pub(crate) fn get_string_list(
        &self,
        column: &'static str,
    ) -> Result<Vec<String>, SchemaRowError> {
        match self.get(column) {
            None => Ok(Vec::new()),
            Some(value) => value
                .clone()
                .into_string_vec()
                .ok_or(SchemaRowError::UnexpectedType {
                    column,
                    expected: "list<text>",
                }),
        }
    }

    pub(crate) fn get_string_map(
        &self,
        column: &'static str,
    ) -> Result<HashMap<String, String>, SchemaRowError> {
        self.get_required(column)?
            .clone()
            .into_string_map()
            .ok_or(SchemaRowError::UnexpectedType {
                column,
                expected: "map<text, text>",
            })
    }
}

impl<K: Into<String>, V: Into<CqlValue>> FromIterator<(K, V)> for SchemaRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An immutable snapshot of the schema tables of one node, grouped by [SchemaSection],
/// together with the node the rows were read from.
///
/// A snapshot is parsed by exactly one [SchemaParser](super::parsing::SchemaParser).
#[derive(Clone, Debug)]
pub struct SchemaRows {
    node: Arc<Node>,
    keyspaces: Vec<SchemaRow>,
    tables: Vec<SchemaRow>,
    views: Vec<SchemaRow>,
    columns: Vec<SchemaRow>,
    types: Vec<SchemaRow>,
    vertices: Vec<SchemaRow>,
    edges: Vec<SchemaRow>,
}

impl SchemaRows {
    /// Starts building a snapshot of rows read from `node`.
    pub fn builder(node: Arc<Node>) -> SchemaRowsBuilder {
        SchemaRowsBuilder {
            rows: SchemaRows {
                node,
                keyspaces: Vec::new(),
                tables: Vec::new(),
                views: Vec::new(),
                columns: Vec::new(),
                types: Vec::new(),
                vertices: Vec::new(),
                edges: Vec::new(),
            },
        }
    }

    /// The node the rows were read from.
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    /// Rows of one section, in the order they were added.
    pub fn rows(&self, section: SchemaSection) -> &[SchemaRow] {
        match section {
            SchemaSection::Keyspaces => &self.keyspaces,
            SchemaSection::Tables => &self.tables,
            SchemaSection::Views => &self.views,
            SchemaSection::Columns => &self.columns,
            SchemaSection::Types => &self.types,
            SchemaSection::Vertices => &self.vertices,
            SchemaSection::Edges => &self.edges,
        }
    }

    fn rows_mut(&mut self, section: SchemaSection) -> &mut Vec<SchemaRow> {
        match section {
            SchemaSection::Keyspaces => &mut self.keyspaces,
            SchemaSection::Tables => &mut self.tables,
            SchemaSection::Views => &mut self.views,
            SchemaSection::Columns => &mut self.columns,
            SchemaSection::Types => &mut self.types,
            SchemaSection::Vertices => &mut self.vertices,
            SchemaSection::Edges => &mut self.edges,
        }
    }
}

/// Builder of [SchemaRows].
#[derive(Debug)]
pub struct SchemaRowsBuilder {
    rows: SchemaRows,
}

impl SchemaRowsBuilder {
    /// Appends a row to a section.
    pub fn row(mut self, section: SchemaSection, row: SchemaRow) -> Self {
        self.rows.rows_mut(section).push(row);
        self
    }

    /// Appends rows to a section.
    pub fn rows(mut self, section: SchemaSection, rows: impl IntoIterator<Item = SchemaRow>) -> Self {
        self.rows.rows_mut(section).extend(rows);
        self
    }

    /// Finishes the snapshot.
    pub fn build(self) -> SchemaRows {
        self.rows
    }
}
