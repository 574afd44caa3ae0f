use std::collections::BTreeMap;
use std::sync::Arc;

use assert_matches::assert_matches;

use super::{SchemaParser, SchemaParserFactory, ServerFlavor};
use crate::cluster::metadata::rows::{SchemaRow, SchemaRows, SchemaSection};
use crate::cluster::metadata::{
    ColumnKind, ColumnType, EdgeEndpoint, Metadata, NativeType, Strategy,
};
use crate::cluster::node::{node_properties, NodeExtras};
use crate::context::{DriverContext, SchemaConfig};
use crate::errors::{
    KeyspaceStrategyError, MissingUserDefinedType, SchemaParseError, SchemaRowError,
    SingleKeyspaceMetadataError,
};
use crate::utils::test_utils::{
    column_row, keyspace_row, setup_tracing, table_row, test_node, type_row,
};

const DSE_VERSION: &str = "6.8.25";

fn parse_with(config: SchemaConfig, rows: SchemaRows) -> Result<Metadata, SchemaParseError> {
    SchemaParserFactory::new(DriverContext::shared(config))
        .new_instance(rows)
        .parse()
}

fn parse(rows: SchemaRows) -> Result<Metadata, SchemaParseError> {
    parse_with(SchemaConfig::default(), rows)
}

/// Keyspace `ks` with table `users`, a UDT `address` referring to UDT `geo`
/// (listed in reverse dependency order) and view `users_by_name`.
fn regular_schema(dse_version: Option<&str>) -> SchemaRows {
    SchemaRows::builder(test_node(dse_version))
        .row(
            SchemaSection::Keyspaces,
            keyspace_row("ks").with("durable_writes", false),
        )
        .rows(
            SchemaSection::Types,
            [
                type_row(
                    "ks",
                    "address",
                    &[("street", "text"), ("location", "frozen<geo>")],
                ),
                type_row("ks", "geo", &[("lat", "double"), ("lon", "double")]),
            ],
        )
        .rows(
            SchemaSection::Tables,
            [table_row("ks", "users"), table_row("ks", "legacy")],
        )
        .row(
            SchemaSection::Views,
            SchemaRow::new()
                .with("keyspace_name", "ks")
                .with("view_name", "users_by_name")
                .with("base_table_name", "users"),
        )
        .rows(
            SchemaSection::Columns,
            [
                column_row("ks", "users", "bucket", "partition_key", 1, "int"),
                column_row("ks", "users", "id", "partition_key", 0, "uuid"),
                column_row("ks", "users", "created", "clustering", 0, "timestamp"),
                column_row("ks", "users", "name", "regular", -1, "text"),
                column_row("ks", "users", "tags", "static", -1, "set<varchar>"),
                column_row("ks", "users", "home", "regular", -1, "frozen<address>"),
                column_row("ks", "legacy", "key", "partition_key", 0, "blob"),
                column_row("ks", "legacy", "value", "regular", -1, "empty"),
                column_row("ks", "users_by_name", "name", "partition_key", 0, "text"),
                column_row("ks", "users_by_name", "id", "clustering", 0, "uuid"),
            ],
        )
        .build()
}

fn graph_rows(dse_version: Option<&str>) -> SchemaRows {
    let base = regular_schema(dse_version);
    let mut builder = SchemaRows::builder(base.node().clone());
    for section in [
        SchemaSection::Tables,
        SchemaSection::Views,
        SchemaSection::Columns,
        SchemaSection::Types,
    ] {
        builder = builder.rows(section, base.rows(section).iter().cloned());
    }
    builder
        .row(
            SchemaSection::Keyspaces,
            keyspace_row("ks").with("graph_engine", "Core"),
        )
        .rows(
            SchemaSection::Columns,
            [
                column_row("ks", "knows", "person_id", "partition_key", 0, "uuid"),
                column_row("ks", "knows", "friend_id", "clustering", 0, "uuid"),
            ],
        )
        .row(SchemaSection::Tables, table_row("ks", "knows"))
        .row(
            SchemaSection::Vertices,
            table_row("ks", "users").with("label_name", "person"),
        )
        .row(
            SchemaSection::Edges,
            table_row("ks", "knows")
                .with("label_name", "knows")
                .with("from_table", "users")
                .with("from_label", "person")
                .with("from_partition_key_columns", vec!["person_id"])
                .with("from_clustering_columns", Vec::<String>::new())
                .with("to_table", "users")
                .with("to_label", "person")
                .with("to_partition_key_columns", vec!["friend_id"]),
        )
        .build()
}

#[test]
fn test_flavor_detection() {
    assert_eq!(ServerFlavor::detect(&NodeExtras::new()), ServerFlavor::Cassandra);
    assert_eq!(
        ServerFlavor::detect(&NodeExtras::new().with(node_properties::DSE_WORKLOADS, "Cassandra")),
        ServerFlavor::Cassandra
    );
    assert_eq!(
        ServerFlavor::detect(&NodeExtras::new().with(node_properties::DSE_VERSION, DSE_VERSION)),
        ServerFlavor::Dse
    );
}

#[test]
fn test_factory_chooses_parser_by_node_only() {
    setup_tracing();
    let factory = SchemaParserFactory::new(DriverContext::shared(SchemaConfig::default()));

    for dse_version in [None, Some(DSE_VERSION)] {
        let empty = SchemaRows::builder(test_node(dse_version)).build();
        let expected = match dse_version {
            Some(_) => ServerFlavor::Dse,
            None => ServerFlavor::Cassandra,
        };

        let parser = factory.new_instance(empty);
        assert_eq!(parser.flavor(), expected);
        let parser = factory.new_instance(regular_schema(dse_version));
        assert_eq!(parser.flavor(), expected);
        let parser = factory.new_instance(graph_rows(dse_version));
        assert_eq!(parser.flavor(), expected);
        assert_matches!(
            (&parser, expected),
            (SchemaParser::Cassandra(_), ServerFlavor::Cassandra)
                | (SchemaParser::Dse(_), ServerFlavor::Dse)
        );
        assert_eq!(parser.rows().rows(SchemaSection::Edges).len(), 1);
        assert!(Arc::ptr_eq(parser.context(), factory.context()));
    }
}

#[test]
fn test_empty_rows() {
    let metadata = parse(SchemaRows::builder(test_node(None)).build()).unwrap();
    assert_eq!(metadata, Metadata::default());
}

#[test]
fn test_cassandra_schema() {
    setup_tracing();
    let metadata = parse(regular_schema(None)).unwrap();

    let keyspace = metadata.get_keyspace("ks").unwrap();
    assert_eq!(
        keyspace.strategy,
        Strategy::SimpleStrategy {
            replication_factor: 3
        }
    );
    assert!(!keyspace.durable_writes);
    assert_eq!(keyspace.graph_engine, None);

    let geo = keyspace.user_defined_types.get("geo").unwrap();
    assert_eq!(
        geo.field_types,
        vec![
            ("lat".to_owned(), ColumnType::Native(NativeType::Double)),
            ("lon".to_owned(), ColumnType::Native(NativeType::Double)),
        ]
    );
    let address = keyspace.user_defined_types.get("address").unwrap();
    assert_eq!(address.keyspace, "ks");
    assert_eq!(
        address.field_types[1].1,
        ColumnType::UserDefinedType {
            frozen: true,
            definition: geo.clone(),
        }
    );

    let users = metadata.get_table("ks", "users").unwrap();
    assert_eq!(users.partition_key, vec!["id", "bucket"]);
    assert_eq!(users.clustering_key, vec!["created"]);
    assert_eq!(users.columns.len(), 6);
    assert_eq!(users.columns["tags"].kind, ColumnKind::Static);
    assert_eq!(
        users.columns["tags"].typ,
        ColumnType::set_of(ColumnType::Native(NativeType::Text))
    );
    assert_matches!(
        &users.columns["home"].typ,
        ColumnType::UserDefinedType { frozen: true, definition } if definition.name == "address"
    );
    assert_eq!(users.vertex, None);

    let legacy = metadata.get_table("ks", "legacy").unwrap();
    assert!(!legacy.columns.contains_key("value"));
    assert_eq!(legacy.partition_key, vec!["key"]);

    let view = keyspace.views.get("users_by_name").unwrap();
    assert_eq!(view.base_table_name, "users");
    assert_eq!(view.view_metadata.partition_key, vec!["name"]);
    assert!(!keyspace.tables.contains_key("users_by_name"));
}

#[test]
fn test_keyspaces_to_fetch() {
    let rows = SchemaRows::builder(test_node(None))
        .rows(
            SchemaSection::Keyspaces,
            [keyspace_row("ks"), keyspace_row("other")],
        )
        .rows(
            SchemaSection::Tables,
            [table_row("ks", "t"), table_row("other", "t")],
        )
        // Rows of skipped keyspaces are not looked at.
        .row(SchemaSection::Columns, table_row("other", "t"))
        .build();

    let metadata = parse_with(SchemaConfig::new().keyspaces_to_fetch(["ks"]), rows).unwrap();

    assert_eq!(metadata.keyspaces.len(), 1);
    assert!(metadata.get_table("ks", "t").is_some());
}

#[test]
fn test_keyspace_local_errors() {
    setup_tracing();
    let rows = SchemaRows::builder(test_node(None))
        .rows(
            SchemaSection::Keyspaces,
            [
                keyspace_row("ok"),
                keyspace_row("missing_udt"),
                keyspace_row("broken_pk"),
                keyspace_row("broken_ck"),
                SchemaRow::new()
                    .with("keyspace_name", "broken_strategy")
                    .with("replication", BTreeMap::from([("replication_factor", "3")])),
            ],
        )
        .rows(
            SchemaSection::Tables,
            [
                table_row("ok", "t"),
                table_row("missing_udt", "t"),
                table_row("broken_pk", "t"),
                table_row("broken_ck", "t"),
            ],
        )
        .rows(
            SchemaSection::Columns,
            [
                column_row("ok", "t", "a", "partition_key", 0, "int"),
                column_row("missing_udt", "t", "a", "partition_key", 0, "int"),
                column_row("missing_udt", "t", "b", "regular", -1, "frozen<nope>"),
                column_row("broken_pk", "t", "a", "partition_key", 1, "int"),
                column_row("broken_ck", "t", "a", "partition_key", 0, "int"),
                column_row("broken_ck", "t", "b", "clustering", 0, "int"),
                column_row("broken_ck", "t", "c", "clustering", 2, "int"),
            ],
        )
        .build();

    let metadata = parse(rows).unwrap();

    assert_eq!(metadata.keyspaces.len(), 5);
    assert!(metadata.get_table("ok", "t").is_some());
    assert_eq!(
        metadata.keyspaces["missing_udt"],
        Err(SingleKeyspaceMetadataError::MissingUDT(
            MissingUserDefinedType {
                name: "nope".to_owned(),
                keyspace: "missing_udt".to_owned(),
            }
        ))
    );
    assert_eq!(
        metadata.keyspaces["broken_pk"],
        Err(SingleKeyspaceMetadataError::IncompletePartitionKey(0))
    );
    assert_eq!(
        metadata.keyspaces["broken_ck"],
        Err(SingleKeyspaceMetadataError::IncompleteClusteringKey(1))
    );
    assert_eq!(
        metadata.keyspaces["broken_strategy"],
        Err(SingleKeyspaceMetadataError::Strategy(
            KeyspaceStrategyError::MissingClassForStrategyDefinition
        ))
    );
}

#[test]
fn test_broken_udt_drops_keyspace() {
    let rows = SchemaRows::builder(test_node(None))
        .row(SchemaSection::Keyspaces, keyspace_row("ks"))
        .row(
            SchemaSection::Types,
            type_row("ks", "wrapper", &[("inner", "frozen<undefined>")]),
        )
        .row(SchemaSection::Tables, table_row("ks", "t"))
        .row(
            SchemaSection::Columns,
            column_row("ks", "t", "a", "partition_key", 0, "int"),
        )
        .build();

    let metadata = parse(rows).unwrap();

    assert_matches!(
        &metadata.keyspaces["ks"],
        Err(SingleKeyspaceMetadataError::MissingUDT(MissingUserDefinedType { name, .. }))
            if name == "undefined"
    );
}

#[test]
fn test_fatal_errors() {
    let node = test_node(None);

    let missing_replication = SchemaRows::builder(node.clone())
        .row(
            SchemaSection::Keyspaces,
            SchemaRow::new().with("keyspace_name", "ks"),
        )
        .build();
    assert_matches!(
        parse(missing_replication),
        Err(SchemaParseError::InvalidRow {
            section: SchemaSection::Keyspaces,
            error: SchemaRowError::MissingColumn {
                column: "replication"
            }
        })
    );

    let bad_position = SchemaRows::builder(node.clone())
        .row(
            SchemaSection::Columns,
            table_row("ks", "t")
                .with("column_name", "a")
                .with("kind", "regular")
                .with("position", "first")
                .with("type", "int"),
        )
        .build();
    assert_matches!(
        parse(bad_position),
        Err(SchemaParseError::InvalidRow {
            section: SchemaSection::Columns,
            error: SchemaRowError::UnexpectedType {
                column: "position",
                ..
            }
        })
    );

    let bad_type = SchemaRows::builder(node.clone())
        .row(
            SchemaSection::Columns,
            column_row("ks", "t", "a", "regular", -1, "list<int"),
        )
        .build();
    assert_matches!(
        parse(bad_type),
        Err(SchemaParseError::InvalidCqlType { typ, .. }) if typ == "list<int"
    );

    let bad_kind = SchemaRows::builder(node.clone())
        .row(
            SchemaSection::Columns,
            column_row("ks", "t", "a", "weird", -1, "int"),
        )
        .build();
    assert_matches!(
        parse(bad_kind),
        Err(SchemaParseError::UnknownColumnKind { column_kind, .. }) if column_kind == "weird"
    );

    let cycle = SchemaRows::builder(node)
        .rows(
            SchemaSection::Types,
            [
                type_row("ks", "a", &[("b", "frozen<b>")]),
                type_row("ks", "b", &[("a", "frozen<a>")]),
            ],
        )
        .build();
    assert_matches!(
        parse(cycle),
        Err(SchemaParseError::CircularTypeDependency)
    );
}

#[test]
fn test_cassandra_parser_ignores_graph_rows() {
    let metadata = parse(graph_rows(None)).unwrap();

    let keyspace = metadata.get_keyspace("ks").unwrap();
    assert_eq!(keyspace.graph_engine, None);
    assert!(keyspace.tables.values().all(|t| t.vertex.is_none() && t.edge.is_none()));
}

#[test]
fn test_dse_graph_metadata() {
    setup_tracing();
    let metadata = parse(graph_rows(Some(DSE_VERSION))).unwrap();

    let keyspace = metadata.get_keyspace("ks").unwrap();
    assert_eq!(keyspace.graph_engine.as_deref(), Some("Core"));

    let users = metadata.get_table("ks", "users").unwrap();
    assert_eq!(users.vertex.as_ref().unwrap().label_name, "person");
    assert_eq!(users.edge, None);

    let knows = metadata.get_table("ks", "knows").unwrap();
    assert_eq!(knows.vertex, None);
    let edge = knows.edge.as_ref().unwrap();
    assert_eq!(edge.label_name, "knows");
    assert_eq!(
        edge.from,
        EdgeEndpoint::new(
            "users".to_owned(),
            "person".to_owned(),
            vec!["person_id".to_owned()],
            vec![],
        )
    );
    // Null clustering columns read as none.
    assert_eq!(edge.to.partition_key_columns, vec!["friend_id"]);
    assert!(edge.to.clustering_columns.is_empty());
}

#[test]
fn test_dse_skips_unusable_graph_rows() {
    setup_tracing();
    let rows = SchemaRows::builder(test_node(Some(DSE_VERSION)))
        .rows(
            SchemaSection::Keyspaces,
            [
                keyspace_row("ks").with("graph_engine", 5),
                keyspace_row("dropped").with("replication", BTreeMap::<String, String>::new()),
            ],
        )
        .rows(
            SchemaSection::Tables,
            [table_row("ks", "t"), table_row("dropped", "t")],
        )
        .rows(
            SchemaSection::Vertices,
            [
                // No label.
                table_row("ks", "t"),
                // Unknown table.
                table_row("ks", "nope").with("label_name", "x"),
                // Table of a dropped keyspace.
                table_row("dropped", "t").with("label_name", "x"),
            ],
        )
        .row(
            SchemaSection::Edges,
            table_row("ks", "t").with("label_name", "e"),
        )
        .build();

    let metadata = parse(rows).unwrap();

    let keyspace = metadata.get_keyspace("ks").unwrap();
    assert_eq!(keyspace.graph_engine, None);
    assert_eq!(keyspace.tables["t"].vertex, None);
    assert_eq!(keyspace.tables["t"].edge, None);
    assert!(metadata.keyspaces["dropped"].is_err());
}

#[test]
fn test_dse_graph_metadata_disabled() {
    let metadata = parse_with(
        SchemaConfig::new().fetch_graph_metadata(false),
        graph_rows(Some(DSE_VERSION)),
    )
    .unwrap();

    let keyspace = metadata.get_keyspace("ks").unwrap();
    assert_eq!(keyspace.graph_engine, None);
    assert!(keyspace.tables.values().all(|t| t.vertex.is_none() && t.edge.is_none()));

    // Graph decorations are the only difference between the flavors.
    let cassandra = parse(graph_rows(None)).unwrap();
    assert_eq!(keyspace.tables, cassandra.get_keyspace("ks").unwrap().tables);
}
