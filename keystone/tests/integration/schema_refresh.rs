use std::collections::HashMap;
use std::sync::Arc;

use assert_matches::assert_matches;
use keystone::cluster::metadata::rows::{SchemaRow, SchemaRows, SchemaSection};
use keystone::cluster::metadata::{ColumnType, NativeType, Strategy};
use keystone::errors::SchemaParseError;
use keystone::{DriverContext, SchemaConfig, SchemaParserFactory, SchemaRefresher, ServerFlavor};

use crate::utils::{node, setup_tracing, single_keyspace, unique_keyspace_name};

#[test]
fn flavor_follows_node() {
    setup_tracing();
    let factory = SchemaParserFactory::new(DriverContext::shared(SchemaConfig::default()));
    let ks = unique_keyspace_name();

    let cassandra = factory.new_instance(single_keyspace(node(None), &ks, "int"));
    let dse = factory.new_instance(single_keyspace(node(Some("6.8.0")), &ks, "int"));
    assert_eq!(cassandra.flavor(), ServerFlavor::Cassandra);
    assert_eq!(dse.flavor(), ServerFlavor::Dse);

    // Without graph rows both flavors produce the same metadata.
    assert_eq!(cassandra.parse().unwrap(), dse.parse().unwrap());
}

#[test]
fn nested_column_types() {
    setup_tracing();
    let factory = SchemaParserFactory::new(DriverContext::shared(SchemaConfig::default()));
    let ks = unique_keyspace_name();

    let metadata = factory
        .new_instance(single_keyspace(
            node(None),
            &ks,
            "map<text, frozen<list<tuple<int, vector<float, 3>>>>>",
        ))
        .parse()
        .unwrap();

    let keyspace = metadata.get_keyspace(&ks).unwrap();
    assert_eq!(
        keyspace.strategy,
        Strategy::NetworkTopologyStrategy {
            datacenter_repfactors: HashMap::from([("dc1".to_owned(), 3), ("dc2".to_owned(), 1)])
        }
    );
    assert!(keyspace.durable_writes);

    let typ = &metadata.get_table(&ks, "t").unwrap().columns["v"].typ;
    assert_eq!(
        typ.to_string(),
        "map<text, frozen<list<tuple<int, vector<float, 3>>>>>"
    );
    assert_matches!(typ, ColumnType::Collection { frozen: false, .. });
    assert_eq!(
        metadata.get_table(&ks, "t").unwrap().columns["pk"].typ,
        ColumnType::Native(NativeType::Int)
    );
}

#[tokio::test]
async fn refresher_publishes_only_successful_parses() {
    setup_tracing();
    let refresher = Arc::new(SchemaRefresher::new(DriverContext::shared(
        SchemaConfig::new().session_name("integration"),
    )));
    let mut versions = refresher.subscribe();
    let ks = unique_keyspace_name();

    let first = refresher
        .refresh(single_keyspace(node(None), &ks, "text"))
        .unwrap();
    versions.changed().await.unwrap();
    assert_eq!(*versions.borrow_and_update(), 1);

    let broken = SchemaRows::builder(node(None))
        .row(
            SchemaSection::Columns,
            SchemaRow::new()
                .with("keyspace_name", ks.as_str())
                .with("table_name", "t")
                .with("column_name", "v")
                .with("kind", "regular")
                .with("position", -1)
                .with("type", "map<int>"),
        )
        .build();
    assert_matches!(
        refresher.refresh(broken),
        Err(SchemaParseError::InvalidCqlType { .. })
    );

    assert!(!versions.has_changed().unwrap());
    assert_eq!(refresher.version(), 1);
    assert!(Arc::ptr_eq(&first, &refresher.metadata()));
}
