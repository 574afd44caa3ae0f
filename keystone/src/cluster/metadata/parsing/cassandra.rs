use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use itertools::Itertools;
use tracing::{debug, trace, warn};

use super::super::cql_type::{map_string_to_cql_type, topo_sort_udts, UdtDefinition};
use super::super::rows::{SchemaRow, SchemaRows, SchemaSection};
use super::super::{
    strategy_from_string_map, Column, ColumnKind, Keyspace, MaterializedView, Metadata,
    PerKeyspaceResult, PerKsTableResult, PerTable, Table, UserDefinedType,
};
use crate::context::DriverContext;
use crate::errors::{
    MissingUserDefinedType, SchemaParseError, SchemaRowError, SingleKeyspaceMetadataError,
};

// Upon migration from thrift to CQL, Cassandra internally creates a surrogate column "value" of
// type EmptyType for dense tables. This resolves into this CQL type name.
// This column shouldn't be exposed to the user but is currently exposed in system tables.
const THRIFT_EMPTY_TYPE: &str = "empty";

type KeyspaceUdts = PerTable<Arc<UserDefinedType>>;

/// Columns of one table, with key columns still keyed by their position.
#[derive(Default)]
struct TableColumns {
    columns: HashMap<String, Column>,
    partition_key: Vec<(i32, String)>,
    clustering_key: Vec<(i32, String)>,
}

pub(super) fn invalid_row(section: SchemaSection) -> impl Fn(SchemaRowError) -> SchemaParseError {
    move |error| SchemaParseError::InvalidRow { section, error }
}

/// Parser of the schema tables as laid out by Apache Cassandra 3.0 and later.
///
/// Reads keyspaces, tables, views, columns and user defined types. Graph
/// sections, if present in the rows, are ignored.
#[derive(Debug)]
pub struct CassandraSchemaParser {
    rows: SchemaRows,
    context: Arc<DriverContext>,
}

impl CassandraSchemaParser {
    /// Creates a parser of `rows`.
    pub fn new(rows: SchemaRows, context: Arc<DriverContext>) -> Self {
        Self { rows, context }
    }

    /// The rows to be parsed.
    pub fn rows(&self) -> &SchemaRows {
        &self.rows
    }

    /// The context the parser was created with.
    pub fn context(&self) -> &Arc<DriverContext> {
        &self.context
    }

    /// Parses the rows into schema metadata.
    pub fn parse(self) -> Result<Metadata, SchemaParseError> {
        self.parse_base()
    }

    /// Parses the sections shared by all flavors.
    pub(super) fn parse_base(&self) -> Result<Metadata, SchemaParseError> {
        let mut all_user_defined_types = self.parse_user_defined_types()?;
        let mut tables_schema = self.parse_tables_schema(&all_user_defined_types)?;
        // Both functions take the tables they find out of `tables_schema`.
        // No name appears both in `system_schema.tables` and `system_schema.views`.
        let mut all_tables = self.parse_tables(&mut tables_schema)?;
        let mut all_views = self.parse_views(&mut tables_schema)?;

        let section = SchemaSection::Keyspaces;
        let mut keyspaces = HashMap::new();
        for (keyspace_name, row) in self.keyspace_rows(section)? {
            let strategy_map = row
                .get_string_map("replication")
                .map_err(invalid_row(section))?;
            let durable_writes = row
                .get_opt_bool("durable_writes")
                .map_err(invalid_row(section))?
                .unwrap_or(true);

            let strategy = strategy_from_string_map(strategy_map);
            let tables = all_tables
                .remove(keyspace_name)
                .unwrap_or_else(|| Ok(HashMap::new()));
            let views = all_views
                .remove(keyspace_name)
                .unwrap_or_else(|| Ok(HashMap::new()));
            let user_defined_types = all_user_defined_types
                .remove(keyspace_name)
                .unwrap_or_else(|| Ok(HashMap::new()));

            // Any inconsistency drops the metadata of the whole keyspace.
            let keyspace = match (strategy, tables, views, user_defined_types) {
                (Ok(strategy), Ok(tables), Ok(views), Ok(user_defined_types)) => Ok(Keyspace {
                    strategy,
                    durable_writes,
                    tables,
                    views,
                    user_defined_types,
                    graph_engine: None,
                }),
                (Err(e), _, _, _) => Err(SingleKeyspaceMetadataError::Strategy(e)),
                (_, Err(e), _, _) | (_, _, Err(e), _) => Err(e),
                (_, _, _, Err(e)) => Err(SingleKeyspaceMetadataError::MissingUDT(e)),
            };

            if let Err(error) = &keyspace {
                warn!(
                    keyspace = keyspace_name,
                    %error,
                    "Dropping metadata of keyspace"
                );
            }
            keyspaces.insert(keyspace_name.to_owned(), keyspace);
        }

        Ok(Metadata { keyspaces })
    }

    /// Rows of `section` belonging to keyspaces selected by the configuration,
    /// paired with their keyspace name.
    pub(super) fn keyspace_rows(
        &self,
        section: SchemaSection,
    ) -> Result<Vec<(&str, &SchemaRow)>, SchemaParseError> {
        let config = self.context.schema_config();
        self.rows
            .rows(section)
            .iter()
            .map(|row| {
                let keyspace_name = row
                    .get_string("keyspace_name")
                    .map_err(invalid_row(section))?;
                Ok::<_, SchemaParseError>((keyspace_name, row))
            })
            .filter_ok(|(keyspace_name, _)| config.should_fetch_keyspace(keyspace_name))
            .collect()
    }

    fn parse_user_defined_types(
        &self,
    ) -> Result<PerKeyspaceResult<KeyspaceUdts, MissingUserDefinedType>, SchemaParseError> {
        let section = SchemaSection::Types;
        let mut udt_rows = self
            .keyspace_rows(section)?
            .into_iter()
            .map(|(keyspace_name, row)| {
                let type_name = row.get_string("type_name").map_err(invalid_row(section))?;
                let field_names = row
                    .get_string_list("field_names")
                    .map_err(invalid_row(section))?;
                let field_types = row
                    .get_string_list("field_types")
                    .map_err(invalid_row(section))?;
                UdtDefinition::parse(
                    keyspace_name.to_owned(),
                    type_name.to_owned(),
                    field_names,
                    &field_types,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let instant_before_toposort = Instant::now();
        topo_sort_udts(&mut udt_rows)?;
        let toposort_elapsed = instant_before_toposort.elapsed();
        debug!(
            "Toposort of UDT definitions took {:.2} ms (udts len: {})",
            toposort_elapsed.as_secs_f64() * 1000.,
            udt_rows.len(),
        );

        let mut udts = HashMap::new();
        'udts_loop: for udt_row in udt_rows {
            let UdtDefinition {
                keyspace_name,
                type_name,
                field_names,
                field_types,
            } = udt_row;

            let keyspace_udts_result = udts
                .entry(keyspace_name.clone())
                .or_insert_with(|| Ok(HashMap::new()));

            // A keyspace with a broken type is dropped anyway.
            let keyspace_udts = match keyspace_udts_result {
                Ok(udts) => udts,
                Err(_) => continue,
            };

            let mut fields = Vec::with_capacity(field_names.len());
            for (field_name, field_type) in field_names.into_iter().zip(field_types) {
                match field_type.into_cql_type(&keyspace_name, keyspace_udts) {
                    Ok(cql_type) => fields.push((field_name, cql_type)),
                    Err(e) => {
                        *keyspace_udts_result = Err(e);
                        continue 'udts_loop;
                    }
                }
            }

            trace!(keyspace = keyspace_name, udt = type_name, "Parsed UDT");
            let udt = Arc::new(UserDefinedType {
                name: type_name.clone(),
                keyspace: keyspace_name,
                field_types: fields,
            });
            keyspace_udts.insert(type_name, udt);
        }

        Ok(udts)
    }

    fn parse_tables_schema(
        &self,
        udts: &PerKeyspaceResult<KeyspaceUdts, MissingUserDefinedType>,
    ) -> Result<PerKsTableResult<Table, SingleKeyspaceMetadataError>, SchemaParseError> {
        let section = SchemaSection::Columns;
        let empty_ok_map: Result<KeyspaceUdts, MissingUserDefinedType> = Ok(HashMap::new());
        let mut tables_schema: PerKsTableResult<TableColumns, SingleKeyspaceMetadataError> =
            HashMap::new();

        for (keyspace_name, row) in self.keyspace_rows(section)? {
            let table_name = row.get_string("table_name").map_err(invalid_row(section))?;
            let column_name = row.get_string("column_name").map_err(invalid_row(section))?;
            let kind = row.get_string("kind").map_err(invalid_row(section))?;
            let position = row.get_int("position").map_err(invalid_row(section))?;
            let type_ = row.get_string("type").map_err(invalid_row(section))?;

            if type_ == THRIFT_EMPTY_TYPE {
                continue;
            }

            let key = (keyspace_name.to_owned(), table_name.to_owned());

            let keyspace_udts = match udts.get(keyspace_name).unwrap_or(&empty_ok_map) {
                Ok(udts) => udts,
                Err(e) => {
                    // The keyspace gets dropped as a whole, the table carries the reason.
                    tables_schema.insert(key, Err(e.clone().into()));
                    continue;
                }
            };

            let pre_cql_type = map_string_to_cql_type(type_)?;
            let cql_type = match pre_cql_type.into_cql_type(keyspace_name, keyspace_udts) {
                Ok(t) => t,
                Err(e) => {
                    tables_schema.insert(key, Err(e.into()));
                    continue;
                }
            };

            let kind = ColumnKind::from_str(kind).map_err(|_| {
                SchemaParseError::UnknownColumnKind {
                    keyspace_name: keyspace_name.to_owned(),
                    table_name: table_name.to_owned(),
                    column_name: column_name.to_owned(),
                    column_kind: kind.to_owned(),
                }
            })?;

            let Ok(entry) = tables_schema
                .entry(key)
                .or_insert_with(|| Ok(TableColumns::default()))
            else {
                // This table was previously marked as broken, no way to insert anything.
                continue;
            };

            match kind {
                ColumnKind::PartitionKey => {
                    entry.partition_key.push((position, column_name.to_owned()))
                }
                ColumnKind::Clustering => {
                    entry.clustering_key.push((position, column_name.to_owned()))
                }
                _ => (),
            }

            entry.columns.insert(
                column_name.to_owned(),
                Column {
                    typ: cql_type,
                    kind,
                },
            );
        }

        let result = tables_schema
            .into_iter()
            .map(|(keyspace_and_table_name, table_result)| {
                let table = table_result.and_then(|table| {
                    let partition_key = validate_key_columns(table.partition_key)
                        .map_err(SingleKeyspaceMetadataError::IncompletePartitionKey)?;
                    let clustering_key = validate_key_columns(table.clustering_key)
                        .map_err(SingleKeyspaceMetadataError::IncompleteClusteringKey)?;
                    Ok(Table {
                        columns: table.columns,
                        partition_key,
                        clustering_key,
                        vertex: None,
                        edge: None,
                    })
                });
                (keyspace_and_table_name, table)
            })
            .collect();

        Ok(result)
    }

    fn parse_tables(
        &self,
        tables: &mut PerKsTableResult<Table, SingleKeyspaceMetadataError>,
    ) -> Result<PerKeyspaceResult<PerTable<Table>, SingleKeyspaceMetadataError>, SchemaParseError>
    {
        let section = SchemaSection::Tables;
        let mut result = HashMap::new();

        for (keyspace_name, row) in self.keyspace_rows(section)? {
            let table_name = row.get_string("table_name").map_err(invalid_row(section))?;
            let keyspace_and_table_name = (keyspace_name.to_owned(), table_name.to_owned());

            let table = tables
                .remove(&keyspace_and_table_name)
                .unwrap_or_else(|| Ok(Table::default()));

            let mut entry = result
                .entry(keyspace_and_table_name.0)
                .or_insert_with(|| Ok(HashMap::new()));
            match (&mut entry, table) {
                (Ok(tables), Ok(table)) => {
                    let _ = tables.insert(keyspace_and_table_name.1, table);
                }
                (Err(_), _) => (),
                (Ok(_), Err(e)) => *entry = Err(e),
            };
        }

        Ok(result)
    }

    fn parse_views(
        &self,
        tables: &mut PerKsTableResult<Table, SingleKeyspaceMetadataError>,
    ) -> Result<
        PerKeyspaceResult<PerTable<MaterializedView>, SingleKeyspaceMetadataError>,
        SchemaParseError,
    > {
        let section = SchemaSection::Views;
        let mut result = HashMap::new();

        for (keyspace_name, row) in self.keyspace_rows(section)? {
            let view_name = row.get_string("view_name").map_err(invalid_row(section))?;
            let base_table_name = row
                .get_string("base_table_name")
                .map_err(invalid_row(section))?;
            let keyspace_and_view_name = (keyspace_name.to_owned(), view_name.to_owned());

            let materialized_view = tables
                .remove(&keyspace_and_view_name)
                .unwrap_or_else(|| Ok(Table::default()))
                .map(|table| MaterializedView {
                    view_metadata: table,
                    base_table_name: base_table_name.to_owned(),
                });

            let mut entry = result
                .entry(keyspace_and_view_name.0)
                .or_insert_with(|| Ok(HashMap::new()));
            match (&mut entry, materialized_view) {
                (Ok(views), Ok(view)) => {
                    let _ = views.insert(keyspace_and_view_name.1, view);
                }
                (Err(_), _) => (),
                (Ok(_), Err(e)) => *entry = Err(e),
            };
        }

        Ok(result)
    }
}

/// Orders key columns by position. Fails with the first position
/// that has no column.
fn validate_key_columns(mut key_columns: Vec<(i32, String)>) -> Result<Vec<String>, i32> {
    key_columns.sort_unstable_by_key(|(position, _)| *position);

    key_columns
        .into_iter()
        .zip(0..)
        .map(|((position, column_name), idx)| {
            if idx == position {
                Ok(column_name)
            } else {
                Err(idx)
            }
        })
        .collect()
}
