//! Multi-cluster layouts
//!
//! Numbering always starts with the gateway (1), then one relay per cluster
//! (2..=clusters+1), then cluster members in cluster-major order. The mobile
//! layout lists every static member before any mobile one.

use crate::layout::{circle_point, round_coord};
use crate::link::{FixedLink, LinkDescriptor, TypeRule};
use crate::node::{NodeClass, NodeId, NodeRole, Position};
use crate::params::LayoutParams;
use crate::{ClusterShape, Family, Topology, TopologyError};
use tracing::debug;

/// Id of member `index` of cluster `cluster` in the static layout
pub fn static_member_id(shape: ClusterShape, cluster: usize, index: usize) -> NodeId {
    NodeId::new((2 + shape.clusters + cluster * shape.per_cluster + index) as u32)
}

/// Id of the relay heading cluster `cluster`
pub fn relay_id(cluster: usize) -> NodeId {
    NodeId::new(cluster as u32 + 2)
}

/// Fixed-link layout: relays form a star into the gateway, each cluster's
/// members form a complete graph plus a star into their relay.
pub fn static_clusters(shape: ClusterShape, params: &LayoutParams) -> Result<Topology, TopologyError> {
    shape.validate()?;
    let links = &params.links;
    let mut connections: Vec<LinkDescriptor> = Vec::new();

    for i in 0..shape.clusters {
        let [down, up] = FixedLink::pair(NodeId::GATEWAY, relay_id(i), links.rssi, links.gateway_link_quality);
        connections.push(down.into());
        connections.push(up.into());
    }

    for i in 0..shape.clusters {
        for j in 0..shape.per_cluster {
            let node = static_member_id(shape, i, j);
            let [down, up] = FixedLink::pair(relay_id(i), node, links.rssi, links.relay_link_quality);
            connections.push(down.into());
            connections.push(up.into());
        }
    }

    for i in 0..shape.clusters {
        for j in 0..shape.per_cluster {
            let a = static_member_id(shape, i, j);
            for k in (j + 1)..shape.per_cluster {
                let b = static_member_id(shape, i, k);
                let [ab, ba] = FixedLink::pair(a, b, links.rssi, links.member_link_quality);
                connections.push(ab.into());
                connections.push(ba.into());
            }
        }
    }

    let geometry = &params.geometry;
    let mut positions = Vec::with_capacity(shape.node_count());
    let mut next_id = push_gateway_and_relays(&mut positions, shape, geometry.relay_radius);

    for i in 0..shape.clusters {
        let (cx, cy) = circle_point(geometry.cluster_centre_radius, i, shape.clusters);
        for j in 0..shape.per_cluster {
            let (x, y) = circle_point(geometry.member_radius, j, shape.per_cluster);
            positions.push(Position {
                id: next_id,
                x: round_coord(x + cx),
                y: round_coord(y + cy),
                role: NodeRole::Member { cluster: i, index: j },
            });
            next_id = next_id.next();
        }
    }

    debug!(
        "static layout {}x{}: {} nodes, {} links",
        shape.clusters,
        shape.per_cluster,
        positions.len(),
        connections.len()
    );

    let topology = Topology {
        family: Family::Static,
        shape,
        positions,
        links: connections,
    };
    topology.check_node_sequence()?;
    Ok(topology)
}

/// Distance-based layout: only gateway/relay links are explicit; everything
/// else is a UDGM rule the simulator resolves from positions. Mobile members
/// start on top of their relay.
pub fn mobile_clusters(shape: ClusterShape, params: &LayoutParams) -> Result<Topology, TopologyError> {
    shape.validate()?;
    if params.split.denominator == 0 || params.split.numerator > params.split.denominator {
        return Err(TopologyError::InvalidParameter(format!(
            "mobile split {}/{} must be a fraction in [0, 1]",
            params.split.numerator, params.split.denominator
        )));
    }

    let links = &params.links;
    let mut connections: Vec<LinkDescriptor> = Vec::new();

    for i in 0..shape.clusters {
        let [down, up] = FixedLink::pair(NodeId::GATEWAY, relay_id(i), links.rssi, links.gateway_link_quality);
        connections.push(down.into());
        connections.push(up.into());
    }

    use NodeClass::*;
    let rules = [
        TypeRule::Within { class: MobileLeafNodes },
        TypeRule::Within { class: StaticLeafNodes },
        TypeRule::Between { from: StaticLeafNodes, to: RouterNodes },
        TypeRule::Between { from: RouterNodes, to: StaticLeafNodes },
        TypeRule::Between { from: MobileLeafNodes, to: RouterNodes },
        TypeRule::Between { from: RouterNodes, to: MobileLeafNodes },
        TypeRule::Between { from: MobileLeafNodes, to: StaticLeafNodes },
        TypeRule::Between { from: StaticLeafNodes, to: MobileLeafNodes },
    ];
    connections.extend(rules.into_iter().map(LinkDescriptor::from));

    let geometry = &params.geometry;
    let (num_static, num_mobile) = params.split.split(shape.per_cluster);
    let mut positions = Vec::with_capacity(shape.node_count());
    let mut next_id = push_gateway_and_relays(&mut positions, shape, geometry.relay_radius);

    for i in 0..shape.clusters {
        let (cx, cy) = circle_point(geometry.cluster_centre_radius, i, shape.clusters);
        for j in 0..num_static {
            let (x, y) = circle_point(geometry.member_radius, j, num_static);
            positions.push(Position {
                id: next_id,
                x: round_coord(x + cx),
                y: round_coord(y + cy),
                role: NodeRole::Member { cluster: i, index: j },
            });
            next_id = next_id.next();
        }
    }

    for i in 0..shape.clusters {
        let (cx, cy) = circle_point(geometry.cluster_centre_radius, i, shape.clusters);
        for j in 0..num_mobile {
            positions.push(Position {
                id: next_id,
                x: round_coord(cx),
                y: round_coord(cy),
                role: NodeRole::MobileMember { cluster: i, index: j },
            });
            next_id = next_id.next();
        }
    }

    debug!(
        "mobile layout {}x{}: {} static + {} mobile per cluster",
        shape.clusters, shape.per_cluster, num_static, num_mobile
    );

    let topology = Topology {
        family: Family::Mobile,
        shape,
        positions,
        links: connections,
    };
    topology.check_node_sequence()?;
    Ok(topology)
}

/// Gateway at the origin plus one relay per cluster. Returns the next free id.
fn push_gateway_and_relays(positions: &mut Vec<Position>, shape: ClusterShape, radius: f64) -> NodeId {
    positions.push(Position {
        id: NodeId::GATEWAY,
        x: 0,
        y: 0,
        role: NodeRole::Gateway,
    });
    let mut next_id = NodeId::GATEWAY.next();
    for i in 0..shape.clusters {
        let (x, y) = circle_point(radius, i, shape.clusters);
        positions.push(Position {
            id: next_id,
            x: round_coord(x),
            y: round_coord(y),
            role: NodeRole::Relay { cluster: i },
        });
        next_id = next_id.next();
    }
    next_id
}
