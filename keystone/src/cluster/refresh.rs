use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::{debug, debug_span, field::Empty};

use super::metadata::parsing::SchemaParserFactory;
use super::metadata::rows::SchemaRows;
use super::metadata::Metadata;
use crate::context::DriverContext;
use crate::errors::SchemaParseError;
use crate::utils::RecordError;

/// Keeps the current schema metadata of a session and replaces it upon refresh.
///
/// Every call to [SchemaRefresher::refresh] parses a snapshot of schema rows
/// with a parser matching the flavor of the node the rows come from. On
/// success, the new metadata is published atomically and the version counter
/// is bumped. Readers holding an older [`Arc<Metadata>`] keep a consistent
/// view. On failure, the previously published metadata stays in place.
pub struct SchemaRefresher {
    factory: SchemaParserFactory,
    metadata: ArcSwap<Metadata>,
    // Holds the number of successful refreshes.
    version_sender: watch::Sender<u64>,
}

impl std::fmt::Debug for SchemaRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRefresher")
            .field("version", &self.version())
            .field("keyspaces", &self.metadata.load().keyspaces.len())
            .finish_non_exhaustive()
    }
}

impl SchemaRefresher {
    /// Creates a refresher holding empty metadata at version 0.
    pub fn new(context: Arc<DriverContext>) -> Self {
        let (version_sender, _) = watch::channel(0);
        Self {
            factory: SchemaParserFactory::new(context),
            metadata: ArcSwap::from_pointee(Metadata::default()),
            version_sender,
        }
    }

    /// The currently published metadata.
    pub fn metadata(&self) -> Arc<Metadata> {
        self.metadata.load_full()
    }

    /// Number of successful refreshes so far.
    pub fn version(&self) -> u64 {
        *self.version_sender.borrow()
    }

    /// Subscribes to refreshes. The receiver sees a change each time new
    /// metadata gets published.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version_sender.subscribe()
    }

    /// Parses `rows` and publishes the result.
    pub fn refresh(&self, rows: SchemaRows) -> Result<Arc<Metadata>, SchemaParseError> {
        let span = debug_span!(
            "schema_refresh",
            session = self.factory.context().log_name(),
            node = %rows.node(),
            error = Empty,
        );

        let parser = self.factory.new_instance(rows);
        let metadata = Arc::new(span.in_scope(|| parser.parse()).record_error(&span)?);

        // The value lock orders concurrent publications.
        let mut published_version = 0;
        self.version_sender.send_modify(|version| {
            self.metadata.store(metadata.clone());
            *version += 1;
            published_version = *version;
        });
        span.in_scope(|| debug!(version = published_version, "Published schema metadata"));

        Ok(metadata)
    }
}
