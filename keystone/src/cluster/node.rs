//! Representation of a single node of the cluster.

use std::collections::HashMap;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use uuid::Uuid;

/// Well-known keys of the [NodeExtras] map.
pub mod node_properties {
    /// Version of DataStax Enterprise run by the node.
    /// Present only on DSE nodes, so it also identifies the server flavor.
    pub const DSE_VERSION: &str = "DSE_VERSION";
    /// Workloads (e.g. `Cassandra`, `Graph`, `Search`) enabled on a DSE node.
    pub const DSE_WORKLOADS: &str = "DSE_WORKLOADS";
    /// Server id of a DSE node.
    pub const SERVER_ID: &str = "SERVER_ID";
}

/// Additional properties of a node, reported by the node itself
/// and keyed by the constants in [node_properties].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeExtras {
    properties: HashMap<String, String>,
}

impl NodeExtras {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, replacing a previous value of the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns the value of a property, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Checks whether a property is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the map has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NodeExtras {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Node represents a cluster node along with its data.
///
/// Nodes are immutable and shared as `Arc<Node>`: a node whose
/// properties change is represented by a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique identifier of the node.
    pub host_id: Uuid,
    /// Address the node is reachable at.
    pub address: SocketAddr,
    /// Datacenter of the node, if known.
    pub datacenter: Option<String>,
    /// Rack of the node, if known.
    pub rack: Option<String>,
    /// Properties reported by the node.
    pub extras: NodeExtras,
}

/// A way that Nodes are often passed and accessed in the driver's code.
pub type NodeRef<'a> = &'a Arc<Node>;

impl Node {
    /// Creates a node with no datacenter, rack or extra properties.
    pub fn new(host_id: Uuid, address: SocketAddr) -> Self {
        Self {
            host_id,
            address,
            datacenter: None,
            rack: None,
            extras: NodeExtras::new(),
        }
    }

    /// Sets the datacenter and rack of the node.
    pub fn with_location(
        mut self,
        datacenter: impl Into<String>,
        rack: impl Into<String>,
    ) -> Self {
        self.datacenter = Some(datacenter.into());
        self.rack = Some(rack.into());
        self
    }

    /// Replaces the extra properties of the node.
    pub fn with_extras(mut self, extras: NodeExtras) -> Self {
        self.extras = extras;
        self
    }

    /// The DSE version, if the node runs DataStax Enterprise.
    pub fn dse_version(&self) -> Option<&str> {
        self.extras.get(node_properties::DSE_VERSION)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.address, self.host_id)
    }
}
