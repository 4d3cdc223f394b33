//! Cross-checks on generated layouts through the public API

use serde_json::Value;
use topology::{ClusterShape, Family, LayoutParams, NodeRole, Topology};

fn params_for(family: Family) -> LayoutParams {
    match family {
        Family::Static => LayoutParams::static_clusters(),
        Family::Mobile => LayoutParams::mobile_clusters(),
    }
}

#[test]
fn test_blocks_are_valid_json_arrays() {
    for family in [Family::Static, Family::Mobile] {
        for (clusters, per_cluster) in [(3, 1), (3, 3), (3, 10), (5, 1), (5, 3), (5, 10)] {
            let shape = ClusterShape::new(clusters, per_cluster);
            let t = Topology::generate(family, shape, &params_for(family)).unwrap();

            let positions: Value = serde_json::from_str(&t.positions_block()).unwrap();
            let positions = positions.as_array().unwrap();
            assert_eq!(positions.len(), shape.node_count());
            for (i, p) in positions.iter().enumerate() {
                assert_eq!(p["ID"].as_u64(), Some(i as u64 + 1));
            }

            let connections: Value = serde_json::from_str(&t.connections_block()).unwrap();
            assert_eq!(connections.as_array().unwrap().len(), t.links.len());
        }
    }
}

#[test]
fn test_mobile_rules_in_block() {
    let t = Topology::generate(Family::Mobile, ClusterShape::new(3, 3), &LayoutParams::mobile_clusters()).unwrap();
    let connections: Value = serde_json::from_str(&t.connections_block()).unwrap();
    let entries = connections.as_array().unwrap();

    let udgm: Vec<&Value> = entries.iter().filter(|e| e["LINK_MODEL"] == "UDGM").collect();
    assert_eq!(udgm.len(), 8);
    assert_eq!(udgm[0]["NODE_TYPE"], "mobile_leaf_nodes");
    assert_eq!(udgm[1]["NODE_TYPE"], "static_leaf_nodes");
    assert_eq!(udgm[2]["FROM_NODE_TYPE"], "static_leaf_nodes");
    assert_eq!(udgm[2]["TO_NODE_TYPE"], "router_nodes");
}

#[test]
fn test_generation_is_deterministic() {
    let shape = ClusterShape::new(5, 10);
    let a = Topology::generate(Family::Static, shape, &LayoutParams::static_clusters()).unwrap();
    let b = Topology::generate(Family::Static, shape, &LayoutParams::static_clusters()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.connections_block(), b.connections_block());
}

#[test]
fn test_members_stay_near_their_centre() {
    let params = LayoutParams::static_clusters();
    let shape = ClusterShape::new(5, 10);
    let t = Topology::generate(Family::Static, shape, &params).unwrap();

    for p in t.positions.iter().filter(|p| p.role.is_member()) {
        let cluster = p.role.cluster().unwrap();
        let (cx, cy) = topology::layout::circle_point(params.geometry.cluster_centre_radius, cluster, shape.clusters);
        let d = ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt();
        // member radius plus rounding slack
        assert!((d - params.geometry.member_radius).abs() < 1.0, "node {} at distance {}", p.id, d);
    }
}

#[test]
fn test_mobile_static_members_circle_the_relay() {
    let params = LayoutParams::mobile_clusters();
    for shape in [ClusterShape::new(3, 3), ClusterShape::new(5, 10)] {
        let t = Topology::generate(Family::Mobile, shape, &params).unwrap();
        let (num_static, _) = params.split.split(shape.per_cluster);

        let members: Vec<_> = t
            .positions
            .iter()
            .filter(|p| matches!(p.role, NodeRole::Member { .. }))
            .collect();
        assert_eq!(members.len(), num_static * shape.clusters);

        for p in members {
            let cluster = p.role.cluster().unwrap();
            let (cx, cy) = topology::layout::circle_point(params.geometry.cluster_centre_radius, cluster, shape.clusters);
            let d = ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt();
            assert!((d - params.geometry.member_radius).abs() < 1.0, "node {} at distance {}", p.id, d);
        }
    }
}
