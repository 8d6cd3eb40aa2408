//! Cost Kernel
//!
//! Pure functions: scalarized edge cost under caller weights, the
//! great-circle admissible heuristic, and reliability/service-level/
//! risk aggregation over a segment sequence. No I/O, no mutation.

use serde::{Deserialize, Serialize};

use crate::network::{Edge, Node};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Caller-supplied objective weights. Conventionally in `[0, 1]` but
/// any non-negative finite value is accepted; scaling is linear so
/// absolute magnitudes only matter within one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub cost: f64,
    pub time: f64,
    pub carbon: f64,
    pub risk: f64,
    pub service_level: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            cost: 0.5,
            time: 0.5,
            carbon: 0.0,
            risk: 0.0,
            service_level: 0.0,
        }
    }
}

impl Weights {
    pub fn new(cost: f64, time: f64, carbon: f64, risk: f64, service_level: f64) -> Self {
        Weights { cost, time, carbon, risk, service_level }
    }

    /// The relaxed-weight fallback vector used by the optimization
    /// engine's single automatic remediation step.
    pub fn relaxed(&self) -> Self {
        Weights {
            cost: self.cost * 0.8,
            time: self.time * 1.2,
            carbon: self.carbon * 0.9,
            risk: self.risk * 1.1,
            service_level: self.service_level,
        }
    }

    fn sum_distance_correlated(&self) -> f64 {
        self.cost + self.time + self.carbon + self.risk
    }
}

/// Scalarized edge cost under `weights`. Non-negative for all
/// non-negative weights and legal edge fields; clamped to 0 as an
/// explicit floor rather than relying on the terms never going negative.
pub fn edge_cost(edge: &Edge, weights: &Weights) -> f64 {
    let base_cost = edge.base_cost.to_string().parse::<f64>().unwrap_or(0.0);
    let cost = weights.cost * base_cost
        + weights.time * edge.base_time
        + weights.carbon * edge.carbon_emissions * edge.distance
        + weights.risk * (1.0 - edge.reliability) * 100.0;
    cost.max(0.0)
}

/// Great-circle (haversine) distance between two points in kilometers,
/// using the mean Earth radius.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (lat1r, lat2r) = (lat1.to_radians(), lat2.to_radians());
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1r.cos() * lat2r.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Admissible A* heuristic: great-circle distance to the goal. When
/// every weight is zero the only admissible lower bound is zero, since
/// no weight term can ever accrue cost along any path.
pub fn heuristic(from: &Node, goal: &Node, weights: &Weights) -> f64 {
    if weights.sum_distance_correlated() == 0.0 {
        return 0.0;
    }
    haversine_km(from.lat, from.lng, goal.lat, goal.lng)
}

/// Product of per-edge reliabilities along a path. The empty product
/// (zero segments) is 1.0 by convention.
pub fn reliability_product<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> f64 {
    edges.into_iter().fold(1.0, |acc, e| acc * e.reliability)
}

/// Mean per-edge reliability, scaled to `[0, 100]`.
pub fn service_level<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> f64 {
    let edges: Vec<&Edge> = edges.into_iter().collect();
    if edges.is_empty() {
        return 100.0;
    }
    let mean = edges.iter().map(|e| e.reliability).sum::<f64>() / edges.len() as f64;
    mean * 100.0
}

/// `100 * (1 - reliability)`, clipped to `[0, 100]`.
pub fn risk_score(reliability: f64) -> f64 {
    (100.0 * (1.0 - reliability)).clamp(0.0, 100.0)
}
