//! Configuration and services shared by the components of a driver instance.

use std::sync::Arc;

/// Configuration of schema metadata parsing.
///
/// Built in the same way as the rest of the driver configuration:
/// start from [SchemaConfig::new] (or [Default]) and chain setters.
///
/// # Example
/// ```
/// # use keystone::context::SchemaConfig;
/// let config = SchemaConfig::new()
///     .keyspaces_to_fetch(["my_ks"])
///     .fetch_graph_metadata(false)
///     .session_name("analytics");
/// assert!(config.should_fetch_keyspace("my_ks"));
/// assert!(!config.should_fetch_keyspace("other_ks"));
/// ```
#[derive(Clone, Debug)]
pub struct SchemaConfig {
    keyspaces_to_fetch: Vec<String>,
    fetch_graph_metadata: bool,
    session_name: Option<String>,
}

impl SchemaConfig {
    /// Creates the default configuration: all keyspaces are parsed,
    /// graph metadata included.
    pub fn new() -> Self {
        Self {
            keyspaces_to_fetch: Vec::new(),
            fetch_graph_metadata: true,
            session_name: None,
        }
    }

    /// Restricts parsing to the given keyspaces. Rows of any other keyspace are ignored.
    ///
    /// An empty list (the default) means all keyspaces.
    pub fn keyspaces_to_fetch(
        mut self,
        keyspaces: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.keyspaces_to_fetch = keyspaces.into_iter().map(Into::into).collect();
        self
    }

    /// Controls whether graph metadata (keyspace graph engines, vertex and edge labels)
    /// is read on servers that provide it. Enabled by default.
    pub fn fetch_graph_metadata(mut self, fetch: bool) -> Self {
        self.fetch_graph_metadata = fetch;
        self
    }

    /// Sets the name used to tell sessions apart in logs.
    pub fn session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    /// Keyspaces to parse, empty means all.
    pub fn get_keyspaces_to_fetch(&self) -> &[String] {
        &self.keyspaces_to_fetch
    }

    /// Whether graph metadata is read.
    pub fn get_fetch_graph_metadata(&self) -> bool {
        self.fetch_graph_metadata
    }

    /// The session name, if one was set.
    pub fn get_session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    /// Checks whether rows of the given keyspace should be parsed.
    pub fn should_fetch_keyspace(&self, keyspace_name: &str) -> bool {
        self.keyspaces_to_fetch.is_empty()
            || self.keyspaces_to_fetch.iter().any(|ks| ks == keyspace_name)
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bundle of configuration shared by the components of one driver instance.
///
/// It is immutable and handed around as `Arc<DriverContext>`;
/// the schema parsers only read it.
#[derive(Clone, Debug, Default)]
pub struct DriverContext {
    schema_config: SchemaConfig,
}

impl DriverContext {
    /// Creates a context with the given schema configuration.
    pub fn new(schema_config: SchemaConfig) -> Self {
        Self { schema_config }
    }

    /// Convenience for `Arc::new(DriverContext::new(schema_config))`.
    pub fn shared(schema_config: SchemaConfig) -> Arc<Self> {
        Arc::new(Self::new(schema_config))
    }

    /// Configuration of schema parsing.
    pub fn schema_config(&self) -> &SchemaConfig {
        &self.schema_config
    }

    /// Name of the session owning this context, or a placeholder for logging.
    pub(crate) fn log_name(&self) -> &str {
        self.schema_config.get_session_name().unwrap_or("unnamed")
    }
}
