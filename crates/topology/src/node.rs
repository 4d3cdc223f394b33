//! Node identities, roles and positions
//!
//! The simulator assigns node identity purely by declaration order in the
//! position list, so every record here carries its `NodeId` explicitly and
//! the generator checks the sequence before rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulator node identifier. `1` is always the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// The gateway / RPL root
    pub const GATEWAY: NodeId = NodeId(1);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class of nodes a distance-based link rule applies to.
///
/// The string forms are the node-type names understood by the simulator's
/// mobile config template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    RouterNodes,
    StaticLeafNodes,
    MobileLeafNodes,
}

impl NodeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeClass::RouterNodes => "router_nodes",
            NodeClass::StaticLeafNodes => "static_leaf_nodes",
            NodeClass::MobileLeafNodes => "mobile_leaf_nodes",
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a node inside a clustered layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum NodeRole {
    Gateway,
    /// Relay (TTP) router heading cluster `cluster`
    Relay { cluster: usize },
    /// Member placed on the cluster circle
    Member { cluster: usize, index: usize },
    /// Member starting at its relay's position; the simulator moves it
    MobileMember { cluster: usize, index: usize },
}

impl NodeRole {
    pub fn cluster(&self) -> Option<usize> {
        match *self {
            NodeRole::Gateway => None,
            NodeRole::Relay { cluster }
            | NodeRole::Member { cluster, .. }
            | NodeRole::MobileMember { cluster, .. } => Some(cluster),
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self, NodeRole::Member { .. } | NodeRole::MobileMember { .. })
    }
}

/// Integer-rounded placement of one node
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: NodeId,
    pub x: i64,
    pub y: i64,
    #[serde(flatten)]
    pub role: NodeRole,
}

impl Position {
    /// Render in the `"ID": .., "X": .., "Y": ..` form used inside the
    /// `%POSITIONS%` block
    pub fn render(&self) -> String {
        format!(r#""ID": {}, "X": {}, "Y": {}"#, self.id, self.x, self.y)
    }
}
