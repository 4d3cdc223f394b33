//! Static link constants and layout geometry
//!
//! All link qualities and RSSI values are user-supplied constants; nothing is
//! estimated. `LayoutParams::builder` offers a fluent way to override them.

use crate::Family;
use serde::{Deserialize, Serialize};

/// Constants for the explicit (fixed) links
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkParams {
    pub rssi: i32,
    /// Relay (TTP) to gateway
    pub gateway_link_quality: f64,
    /// Cluster member to its relay
    pub relay_link_quality: f64,
    /// Between members of one cluster
    pub member_link_quality: f64,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            rssi: -80,
            gateway_link_quality: 0.9,
            relay_link_quality: 0.9,
            member_link_quality: 0.9,
        }
    }
}

/// Circle radii used to place relays and members. Missing fields take the
/// static preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Radius of the relay circle around the gateway
    pub relay_radius: f64,
    /// Radius at which each cluster's member circle is centred. The static
    /// layout centres members further out than the relays themselves; the
    /// mobile layout centres them on the relay.
    pub cluster_centre_radius: f64,
    /// Radius of the member circle around its centre
    pub member_radius: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::static_clusters()
    }
}

impl Geometry {
    pub fn static_clusters() -> Self {
        Self {
            relay_radius: 150.0,
            cluster_centre_radius: 250.0,
            member_radius: 40.0,
        }
    }

    pub fn mobile_clusters() -> Self {
        Self {
            relay_radius: 500.0,
            cluster_centre_radius: 500.0,
            member_radius: 40.0,
        }
    }
}

/// How a cluster's members are divided into static and mobile subgroups.
///
/// `static = floor(total * numerator / denominator)`, the rest are mobile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobileSplit {
    pub numerator: usize,
    pub denominator: usize,
}

impl Default for MobileSplit {
    fn default() -> Self {
        Self {
            numerator: 2,
            denominator: 3,
        }
    }
}

impl MobileSplit {
    /// Returns `(static_count, mobile_count)` for one cluster
    pub fn split(&self, total: usize) -> (usize, usize) {
        let num_static = total * self.numerator / self.denominator;
        (num_static, total - num_static)
    }
}

/// Everything a generator needs besides the cluster shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub links: LinkParams,
    pub geometry: Geometry,
    pub split: MobileSplit,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::static_clusters()
    }
}

impl LayoutParams {
    /// The stock parameters of a family
    pub fn preset(family: Family) -> Self {
        match family {
            Family::Static => Self::static_clusters(),
            Family::Mobile => Self::mobile_clusters(),
        }
    }


    pub fn static_clusters() -> Self {
        Self {
            links: LinkParams::default(),
            geometry: Geometry::static_clusters(),
            split: MobileSplit::default(),
        }
    }

    pub fn mobile_clusters() -> Self {
        Self {
            links: LinkParams::default(),
            geometry: Geometry::mobile_clusters(),
            split: MobileSplit::default(),
        }
    }

    pub fn builder(base: LayoutParams) -> LayoutParamsBuilder {
        LayoutParamsBuilder { params: base }
    }
}

/// Fluent overrides on top of a base parameter set
pub struct LayoutParamsBuilder {
    params: LayoutParams,
}

impl LayoutParamsBuilder {
    pub fn rssi(mut self, rssi: i32) -> Self {
        self.params.links.rssi = rssi;
        self
    }

    pub fn gateway_link_quality(mut self, quality: f64) -> Self {
        self.params.links.gateway_link_quality = quality;
        self
    }

    pub fn relay_link_quality(mut self, quality: f64) -> Self {
        self.params.links.relay_link_quality = quality;
        self
    }

    pub fn member_link_quality(mut self, quality: f64) -> Self {
        self.params.links.member_link_quality = quality;
        self
    }

    pub fn relay_radius(mut self, radius: f64) -> Self {
        self.params.geometry.relay_radius = radius;
        self
    }

    pub fn cluster_centre_radius(mut self, radius: f64) -> Self {
        self.params.geometry.cluster_centre_radius = radius;
        self
    }

    pub fn member_radius(mut self, radius: f64) -> Self {
        self.params.geometry.member_radius = radius;
        self
    }

    pub fn split(mut self, numerator: usize, denominator: usize) -> Self {
        self.params.split = MobileSplit {
            numerator,
            denominator,
        };
        self
    }

    pub fn build(self) -> LayoutParams {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_split() {
        let split = MobileSplit::default();
        assert_eq!(split.split(0), (0, 0));
        assert_eq!(split.split(1), (0, 1));
        assert_eq!(split.split(3), (2, 1));
        assert_eq!(split.split(10), (6, 4));
    }

    #[test]
    fn test_geometry_presets_differ_in_centre_radius() {
        let s = Geometry::static_clusters();
        let m = Geometry::mobile_clusters();
        assert_ne!(s.relay_radius, s.cluster_centre_radius);
        assert_eq!(m.relay_radius, m.cluster_centre_radius);
    }

    #[test]
    fn test_builder_overrides() {
        let params = LayoutParams::builder(LayoutParams::static_clusters())
            .rssi(-70)
            .member_link_quality(0.5)
            .cluster_centre_radius(150.0)
            .build();

        assert_eq!(params.links.rssi, -70);
        assert_eq!(params.links.member_link_quality, 0.5);
        assert_eq!(params.links.gateway_link_quality, 0.9);
        assert_eq!(params.geometry.cluster_centre_radius, 150.0);
        assert_eq!(params.geometry.relay_radius, 150.0);
    }

    #[test]
    fn test_partial_params_keep_defaults() {
        let params: LayoutParams =
            serde_json::from_str(r#"{"links": {"rssi": -70}, "geometry": {"member_radius": 60.0}}"#)
                .unwrap();
        assert_eq!(params.links.rssi, -70);
        assert_eq!(params.links.relay_link_quality, 0.9);
        assert_eq!(params.geometry.relay_radius, 150.0);
        assert_eq!(params.geometry.cluster_centre_radius, 250.0);
        assert_eq!(params.geometry.member_radius, 60.0);
        assert_eq!(params.split, MobileSplit::default());

        let split: MobileSplit = serde_json::from_str(r#"{"numerator": 1}"#).unwrap();
        assert_eq!(split.denominator, 3);
        assert_eq!(LayoutParams::preset(Family::Mobile), LayoutParams::mobile_clusters());
    }
}
