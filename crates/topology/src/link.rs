//! Directed link descriptors
//!
//! A link is either a fixed pairwise link with static RSSI and link quality,
//! or a distance-based (UDGM) rule applied to whole classes of nodes. Links
//! are directional; a bidirectional connection is always two descriptors.

use crate::node::{NodeClass, NodeId};
use serde::{Deserialize, Serialize};

/// Explicit link between two nodes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedLink {
    pub from: NodeId,
    pub to: NodeId,
    pub rssi: i32,
    /// 1.0 is a perfect link, 0.0 is no link
    pub link_quality: f64,
}

impl FixedLink {
    /// Both directions of a symmetric link, `a -> b` first
    pub fn pair(a: NodeId, b: NodeId, rssi: i32, link_quality: f64) -> [FixedLink; 2] {
        [
            FixedLink { from: a, to: b, rssi, link_quality },
            FixedLink { from: b, to: a, rssi, link_quality },
        ]
    }
}

/// Distance-based connectivity rule resolved by the simulator from positions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum TypeRule {
    /// Nodes of one class among themselves
    Within { class: NodeClass },
    /// From every node of one class to every node of another
    Between { from: NodeClass, to: NodeClass },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum LinkDescriptor {
    Fixed(FixedLink),
    #[serde(rename = "UDGM")]
    Udgm(TypeRule),
}

impl LinkDescriptor {
    pub fn is_fixed(&self) -> bool {
        matches!(self, LinkDescriptor::Fixed(_))
    }

    pub fn as_fixed(&self) -> Option<&FixedLink> {
        match self {
            LinkDescriptor::Fixed(link) => Some(link),
            LinkDescriptor::Udgm(_) => None,
        }
    }

    /// Render one entry of the `%CONNECTIONS%` block
    pub fn render(&self) -> String {
        match self {
            LinkDescriptor::Fixed(l) => format!(
                r#""FROM_ID": {}, "TO_ID": {}, "RSSI": {}, "LINK_QUALITY": {:?}, "LINK_MODEL": "Fixed""#,
                l.from, l.to, l.rssi, l.link_quality
            ),
            LinkDescriptor::Udgm(TypeRule::Within { class }) => {
                format!(r#""NODE_TYPE": "{}", "LINK_MODEL": "UDGM""#, class)
            }
            LinkDescriptor::Udgm(TypeRule::Between { from, to }) => format!(
                r#""FROM_NODE_TYPE": "{}", "TO_NODE_TYPE": "{}", "LINK_MODEL": "UDGM""#,
                from, to
            ),
        }
    }
}

impl From<FixedLink> for LinkDescriptor {
    fn from(link: FixedLink) -> Self {
        LinkDescriptor::Fixed(link)
    }
}

impl From<TypeRule> for LinkDescriptor {
    fn from(rule: TypeRule) -> Self {
        LinkDescriptor::Udgm(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_link_rendering() {
        let link = LinkDescriptor::Fixed(FixedLink {
            from: NodeId::new(1),
            to: NodeId::new(2),
            rssi: -80,
            link_quality: 0.9,
        });
        assert_eq!(
            link.render(),
            r#""FROM_ID": 1, "TO_ID": 2, "RSSI": -80, "LINK_QUALITY": 0.9, "LINK_MODEL": "Fixed""#
        );
    }

    #[test]
    fn test_rule_rendering() {
        let within = LinkDescriptor::from(TypeRule::Within { class: NodeClass::MobileLeafNodes });
        assert_eq!(within.render(), r#""NODE_TYPE": "mobile_leaf_nodes", "LINK_MODEL": "UDGM""#);

        let between = LinkDescriptor::from(TypeRule::Between {
            from: NodeClass::StaticLeafNodes,
            to: NodeClass::RouterNodes,
        });
        assert_eq!(
            between.render(),
            r#""FROM_NODE_TYPE": "static_leaf_nodes", "TO_NODE_TYPE": "router_nodes", "LINK_MODEL": "UDGM""#
        );
        assert!(!between.is_fixed());
    }

    #[test]
    fn test_pair_is_both_directions() {
        let [ab, ba] = FixedLink::pair(NodeId::new(3), NodeId::new(7), -80, 0.5);
        assert_eq!((ab.from, ab.to), (NodeId::new(3), NodeId::new(7)));
        assert_eq!((ba.from, ba.to), (NodeId::new(7), NodeId::new(3)));
    }

    #[test]
    fn test_perfect_link_keeps_decimal_point() {
        let link = LinkDescriptor::Fixed(FixedLink {
            from: NodeId::new(2),
            to: NodeId::new(1),
            rssi: -70,
            link_quality: 1.0,
        });
        assert!(link.render().contains(r#""LINK_QUALITY": 1.0,"#));
    }
}
