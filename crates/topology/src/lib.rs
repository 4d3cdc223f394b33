//! Network topology generation for clustered TSCH deployments
//!
//! This crate synthesizes node positions and directed link descriptors for
//! two layout families: static multi-cluster networks with explicit fixed
//! links, and mobile multi-cluster networks where most connectivity is
//! resolved by the simulator from distance-based (UDGM) rules. Both are pure
//! and deterministic given the cluster shape and parameters.
//!
//! The externally observable output is the bracketed text form of the link
//! and position lists, substituted into config templates as `%CONNECTIONS%`
//! and `%POSITIONS%`.

pub mod clusters;
pub mod layout;
pub mod link;
pub mod node;
pub mod params;

pub use clusters::{mobile_clusters, static_clusters};
pub use link::{FixedLink, LinkDescriptor, TypeRule};
pub use node::{NodeClass, NodeId, NodeRole, Position};
pub use params::{Geometry, LayoutParams, LayoutParamsBuilder, LinkParams, MobileSplit};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    #[error("a topology needs at least one cluster")]
    NoClusters,

    #[error("node sequence broken: expected id {expected}, found {found}")]
    NodeSequence { expected: u32, found: u32 },

    #[error("node count mismatch: shape implies {expected} nodes, generated {found}")]
    NodeCount { expected: usize, found: usize },

    #[error("link {from}->{to} references a node outside 1..={max}")]
    DanglingLink { from: u32, to: u32, max: u32 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Layout family; each has its own config template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Static,
    Mobile,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Static => f.write_str("static"),
            Family::Mobile => f.write_str("mobile"),
        }
    }
}

/// Number of clusters and members per cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterShape {
    pub clusters: usize,
    pub per_cluster: usize,
}

impl ClusterShape {
    pub fn new(clusters: usize, per_cluster: usize) -> Self {
        Self {
            clusters,
            per_cluster,
        }
    }

    /// Gateway + relays + members
    pub fn node_count(&self) -> usize {
        1 + self.clusters + self.clusters * self.per_cluster
    }

    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.clusters == 0 {
            return Err(TopologyError::NoClusters);
        }
        Ok(())
    }
}

/// Generated layout: positions in declaration order plus directed links
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub family: Family,
    pub shape: ClusterShape,
    pub positions: Vec<Position>,
    pub links: Vec<LinkDescriptor>,
}

impl Topology {
    /// Generate the layout for `family` with that family's own parameters
    pub fn generate(family: Family, shape: ClusterShape, params: &LayoutParams) -> Result<Self, TopologyError> {
        match family {
            Family::Static => static_clusters(shape, params),
            Family::Mobile => mobile_clusters(shape, params),
        }
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Members declared on the member circles (not counting mobile ones)
    pub fn static_member_count(&self) -> usize {
        self.positions
            .iter()
            .filter(|p| matches!(p.role, NodeRole::Member { .. }))
            .count()
    }

    pub fn mobile_member_count(&self) -> usize {
        self.positions
            .iter()
            .filter(|p| matches!(p.role, NodeRole::MobileMember { .. }))
            .count()
    }

    /// Verify the declared ids are exactly `1..=N`, `N` matches the shape,
    /// and every fixed link points inside that range. The simulator numbers
    /// nodes by declaration order, so any gap would silently remap links.
    pub fn check_node_sequence(&self) -> Result<(), TopologyError> {
        let mut expected = NodeId::GATEWAY;
        for p in &self.positions {
            if p.id != expected {
                return Err(TopologyError::NodeSequence {
                    expected: expected.get(),
                    found: p.id.get(),
                });
            }
            expected = expected.next();
        }

        let implied = self.shape.node_count();
        if self.positions.len() != implied {
            return Err(TopologyError::NodeCount {
                expected: implied,
                found: self.positions.len(),
            });
        }

        let max = implied as u32;
        for link in self.links.iter().filter_map(LinkDescriptor::as_fixed) {
            let in_range = |id: NodeId| (1..=max).contains(&id.get());
            if !in_range(link.from) || !in_range(link.to) {
                return Err(TopologyError::DanglingLink {
                    from: link.from.get(),
                    to: link.to.get(),
                    max,
                });
            }
        }
        Ok(())
    }

    /// `%CONNECTIONS%` block
    pub fn connections_block(&self) -> String {
        render_block(self.links.iter().map(LinkDescriptor::render))
    }

    /// `%POSITIONS%` block
    pub fn positions_block(&self) -> String {
        render_block(self.positions.iter().map(Position::render))
    }
}

/// Join entries as `[{a},\n    {b}]\n`. The trailing newline marks the value
/// as a pre-rendered block for the template renderer.
pub fn render_block<I>(entries: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let body: Vec<String> = entries.into_iter().collect();
    format!("[{{{}}}]\n", body.join("},\n    {"))
}
