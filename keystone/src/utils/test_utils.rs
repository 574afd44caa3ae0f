use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::cluster::metadata::rows::SchemaRow;
use crate::cluster::node::{node_properties, Node, NodeExtras};

const DEFAULT_PERIOD: Duration = Duration::from_millis(500);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn setup_tracing() {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(tracing_subscriber::fmt::TestWriter::new())
        .try_init();
}

/// A Cassandra node, or a DSE one if `dse_version` is given.
pub(crate) fn test_node(dse_version: Option<&str>) -> Arc<Node> {
    let extras = match dse_version {
        Some(version) => NodeExtras::new().with(node_properties::DSE_VERSION, version),
        None => NodeExtras::new(),
    };
    Arc::new(
        Node::new(
            Uuid::new_v4(),
            SocketAddr::from((Ipv4Addr::LOCALHOST, 9042)),
        )
        .with_location("dc1", "rack1")
        .with_extras(extras),
    )
}

pub(crate) fn keyspace_row(keyspace_name: &str) -> SchemaRow {
    SchemaRow::new()
        .with("keyspace_name", keyspace_name)
        .with("durable_writes", true)
        .with(
            "replication",
            BTreeMap::from([
                ("class", "org.apache.cassandra.locator.SimpleStrategy"),
                ("replication_factor", "3"),
            ]),
        )
}

pub(crate) fn table_row(keyspace_name: &str, table_name: &str) -> SchemaRow {
    SchemaRow::new()
        .with("keyspace_name", keyspace_name)
        .with("table_name", table_name)
}

pub(crate) fn column_row(
    keyspace_name: &str,
    table_name: &str,
    column_name: &str,
    kind: &str,
    position: i32,
    typ: &str,
) -> SchemaRow {
    table_row(keyspace_name, table_name)
        .with("column_name", column_name)
        .with("kind", kind)
        .with("position", position)
        .with("type", typ)
}

pub(crate) fn type_row(
    keyspace_name: &str,
    type_name: &str,
    fields: &[(&str, &str)],
) -> SchemaRow {
    SchemaRow::new()
        .with("keyspace_name", keyspace_name)
        .with("type_name", type_name)
        .with(
            "field_names",
            fields.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
        )
        .with(
            "field_types",
            fields.iter().map(|(_, typ)| *typ).collect::<Vec<_>>(),
        )
}

/// Starts a check of a condition that is expected to change asynchronously:
/// `check_that(|| ...).every(period).before(timeout).becomes_true().await`.
pub(crate) fn check_that<P>(predicate: P) -> ConditionChecker<P>
where
    P: FnMut() -> bool,
{
    ConditionChecker {
        predicate,
        period: DEFAULT_PERIOD,
        timeout: DEFAULT_TIMEOUT,
    }
}

pub(crate) struct ConditionChecker<P> {
    predicate: P,
    period: Duration,
    timeout: Duration,
}

impl<P> ConditionChecker<P>
where
    P: FnMut() -> bool,
{
    /// How often the predicate is evaluated.
    pub(crate) fn every(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// How long to wait before failing the test.
    pub(crate) fn before(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Panics unless the predicate holds before the timeout.
    pub(crate) async fn becomes_true(self) {
        self.wait_for(true).await
    }

    /// Panics unless the predicate stops holding before the timeout.
    pub(crate) async fn becomes_false(self) {
        self.wait_for(false).await
    }

    async fn wait_for(mut self, expected: bool) {
        let timeout = self.timeout;
        let period = self.period;
        let predicate = &mut self.predicate;
        let polling = async move {
            while predicate() != expected {
                tokio::time::sleep(period).await;
            }
        };
        if tokio::time::timeout(timeout, polling).await.is_err() {
            panic!("Timeout after {:?} while waiting for condition", timeout);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::check_that;

    #[tokio::test]
    async fn test_condition_becomes_true() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        tokio::spawn(async move {
            for _ in 0..3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        check_that(|| counter.load(Ordering::SeqCst) == 3)
            .every(Duration::from_millis(1))
            .before(Duration::from_secs(5))
            .becomes_true()
            .await;
        check_that(|| counter.load(Ordering::SeqCst) < 3)
            .every(Duration::from_millis(1))
            .before(Duration::from_secs(5))
            .becomes_false()
            .await;
    }

    #[tokio::test]
    #[should_panic(expected = "while waiting for condition")]
    async fn test_condition_times_out() {
        check_that(|| false)
            .every(Duration::from_millis(1))
            .before(Duration::from_millis(20))
            .becomes_true()
            .await;
    }
}
