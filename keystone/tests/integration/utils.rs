use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keystone::cluster::metadata::rows::{SchemaRow, SchemaRows, SchemaRowsBuilder, SchemaSection};
use keystone::cluster::node::node_properties;
use keystone::cluster::{Node, NodeExtras};
use uuid::Uuid;

pub(crate) fn setup_tracing() {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(tracing_subscriber::fmt::TestWriter::new())
        .try_init();
}

static UNIQUE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn unique_keyspace_name() -> String {
    let cnt = UNIQUE_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("test_ks_{}_{}", std::process::id(), cnt)
}

pub(crate) fn node(dse_version: Option<&str>) -> Arc<Node> {
    let mut extras = NodeExtras::new();
    if let Some(version) = dse_version {
        extras = extras.with(node_properties::DSE_VERSION, version);
    }
    Arc::new(
        Node::new(Uuid::new_v4(), SocketAddr::from((Ipv4Addr::LOCALHOST, 9042)))
            .with_extras(extras),
    )
}

/// Rows of a keyspace holding one table `t (pk int, v <typ>, PRIMARY KEY (pk))`.
pub(crate) fn keyspace_with_table(
    builder: SchemaRowsBuilder,
    keyspace_name: &str,
    typ: &str,
) -> SchemaRowsBuilder {
    let table = |row: SchemaRow| {
        row.with("keyspace_name", keyspace_name)
            .with("table_name", "t")
    };
    let column = |name: &str, kind: &str, position: i32, typ: &str| {
        table(SchemaRow::new())
            .with("column_name", name)
            .with("kind", kind)
            .with("position", position)
            .with("type", typ)
    };

    builder
        .row(
            SchemaSection::Keyspaces,
            SchemaRow::new()
                .with("keyspace_name", keyspace_name)
                .with(
                    "replication",
                    BTreeMap::from([
                        ("class", "NetworkTopologyStrategy"),
                        ("dc1", "3"),
                        ("dc2", "1"),
                    ]),
                ),
        )
        .row(SchemaSection::Tables, table(SchemaRow::new()))
        .rows(
            SchemaSection::Columns,
            [
                column("pk", "partition_key", 0, "int"),
                column("v", "regular", -1, typ),
            ],
        )
}

pub(crate) fn single_keyspace(node: Arc<Node>, keyspace_name: &str, typ: &str) -> SchemaRows {
    keyspace_with_table(SchemaRows::builder(node), keyspace_name, typ).build()
}
