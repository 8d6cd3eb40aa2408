//! Route Builder
//!
//! Materializes a node-id sequence into a `Route`: per-segment cost
//! breakdowns, totals, reliability/service-level/risk aggregation, and
//! an optional stochastic confidence band. Segments hold owned
//! snapshots of node/edge data so a `Route` stays valid after later
//! store mutation (notably disruption re-routing).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cost::{reliability_product, risk_score, service_level};
use crate::engine::Constraints;
use crate::network::{Edge, NetworkStore, Node};
use crate::solvers::Algorithm;

const CUSTOMS_SURCHARGE: f64 = 150.0;
const INSURANCE_RATE: f64 = 0.02;

/// Ordered decomposition of a monetary total. `total` equals the sum
/// of every other field; nothing is double-counted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub linehaul: f64,
    pub fuel_surcharge: f64,
    pub accessorials: f64,
    pub detention: f64,
    pub drayage: f64,
    pub tolls: f64,
    pub customs: f64,
    pub insurance: f64,
    pub total: f64,
    pub currency: String,
}

impl CostBreakdown {
    fn zero() -> Self {
        CostBreakdown {
            linehaul: 0.0,
            fuel_surcharge: 0.0,
            accessorials: 0.0,
            detention: 0.0,
            drayage: 0.0,
            tolls: 0.0,
            customs: 0.0,
            insurance: 0.0,
            total: 0.0,
            currency: "USD".to_string(),
        }
    }

    fn add(&mut self, other: &CostBreakdown) {
        self.linehaul += other.linehaul;
        self.fuel_surcharge += other.fuel_surcharge;
        self.accessorials += other.accessorials;
        self.detention += other.detention;
        self.drayage += other.drayage;
        self.tolls += other.tolls;
        self.customs += other.customs;
        self.insurance += other.insurance;
        self.total += other.total;
    }
}

fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_string().parse::<f64>().unwrap_or(0.0)
}

/// Per-segment cost breakdown. The customs surcharge is keyed on the
/// segment's FROM node, not the TO node — intentional, though flagged
/// as a possible candidate for product review.
fn segment_cost(from: &Node, edge: &Edge) -> CostBreakdown {
    let linehaul = decimal_to_f64(edge.base_cost);
    let fuel_surcharge = decimal_to_f64(edge.fuel_cost);
    let tolls = edge.toll_cost.map(decimal_to_f64).unwrap_or(0.0);
    let customs = if from.customs_required { CUSTOMS_SURCHARGE } else { 0.0 };
    let insurance = INSURANCE_RATE * linehaul;
    let total = linehaul + fuel_surcharge + tolls + customs + insurance;

    CostBreakdown {
        linehaul,
        fuel_surcharge,
        accessorials: 0.0,
        detention: 0.0,
        drayage: 0.0,
        tolls,
        customs,
        insurance,
        total,
        currency: "USD".to_string(),
    }
}

/// One leg of a materialized route, carrying value snapshots of the
/// traversed node/edge rather than store references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub from: Node,
    pub to: Node,
    pub edge: Edge,
    pub mode: crate::network::EdgeMode,
    pub distance: f64,
    pub estimated_time: f64,
    pub cost: CostBreakdown,
    pub carbon_emissions: f64,
}

/// Symmetric band around route totals under a normal approximation,
/// computed when `RouteConfig::stochastic` is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub level: f64,
    pub time_min: f64,
    pub time_max: f64,
    pub cost_min: f64,
    pub cost_max: f64,
}

/// Diagnostic metadata attached to a returned route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMetadata {
    pub algorithm: Algorithm,
    pub compute_time_ms: u64,
    pub alternatives_considered: usize,
}

/// A fully materialized multi-modal route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub segments: Vec<Segment>,
    pub total_distance: f64,
    pub total_time: f64,
    pub total_cost: CostBreakdown,
    pub total_carbon: f64,
    pub service_level: f64,
    pub reliability: f64,
    pub risk_score: f64,
    pub constraints: Option<Constraints>,
    pub confidence: Option<ConfidenceBand>,
    pub metadata: Option<RouteMetadata>,
}

/// Build a `Route` from a node-id path. For each adjacent pair `(u, v)`
/// the FIRST edge in `u`'s adjacency list whose target is `v` is
/// selected; pairs with no such edge are silently skipped (a degenerate
/// route with fewer segments than pairs may result).
pub fn build_route(store: &NetworkStore, path: &[String]) -> Route {
    let mut segments = Vec::new();

    for window in path.windows(2) {
        let (u, v) = (&window[0], &window[1]);
        let Some(from_node) = store.get_node(u) else { continue };
        let Some((to_node, edge)) = store
            .get_neighbors(u)
            .into_iter()
            .find(|(target, _)| &target.id == v)
        else {
            tracing::warn!(from = %u, to = %v, "no direct edge for adjacent pair; segment skipped");
            continue;
        };

        let cost = segment_cost(from_node, edge);
        let carbon_emissions = edge.carbon_emissions * edge.distance;

        segments.push(Segment {
            id: format!("seg-{}", Uuid::new_v4()),
            from: from_node.clone(),
            to: to_node.clone(),
            edge: edge.clone(),
            mode: edge.mode,
            distance: edge.distance,
            estimated_time: edge.base_time,
            cost,
            carbon_emissions,
        });
    }

    let mut total_cost = CostBreakdown::zero();
    let mut total_distance = 0.0;
    let mut total_time = 0.0;
    let mut total_carbon = 0.0;

    for segment in &segments {
        total_cost.add(&segment.cost);
        total_distance += segment.distance;
        total_time += segment.estimated_time;
        total_carbon += segment.carbon_emissions;
    }

    let reliability = reliability_product(segments.iter().map(|s| &s.edge));
    let service_level = service_level(segments.iter().map(|s| &s.edge));
    let risk_score = risk_score(reliability);

    Route {
        id: format!("route-{}", Uuid::new_v4()),
        segments,
        total_distance,
        total_time,
        total_cost,
        total_carbon,
        service_level,
        reliability,
        risk_score,
        constraints: None,
        confidence: None,
        metadata: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{EdgeMode, Node, NodeType};

    fn two_node_store(customs_required: bool) -> NetworkStore {
        let mut store = NetworkStore::new();
        let mut a = Node::new("a", "A", NodeType::Hub, 0.0, 0.0);
        a.customs_required = customs_required;
        store.add_node(a);
        store.add_node(Node::new("b", "B", NodeType::Hub, 1.0, 1.0));
        store.add_edge(Edge {
            id: "e1".to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
            mode: EdgeMode::Road,
            distance: 200.0,
            base_time: 120.0,
            base_cost: Decimal::new(10000, 2),
            capacity: 500.0,
            reliability: 0.8,
            carbon_emissions: 0.2,
            fuel_cost: Decimal::new(2000, 2),
            toll_cost: Some(Decimal::new(500, 2)),
            speed_limit: None,
            road_quality: None,
        });
        store
    }

    #[test]
    fn single_segment_totals_match_sum() {
        let store = two_node_store(false);
        let route = build_route(&store, &["a".to_string(), "b".to_string()]);

        assert_eq!(route.segments.len(), 1);
        assert!((route.total_cost.total - route.segments[0].cost.total).abs() < 1e-9);
        assert_eq!(route.total_distance, 200.0);
        assert_eq!(route.reliability, 0.8);
        assert!((route.risk_score - 20.0).abs() < 1e-9);
    }

    #[test]
    fn customs_surcharge_keyed_on_from_node() {
        let store = two_node_store(true);
        let route = build_route(&store, &["a".to_string(), "b".to_string()]);
        assert_eq!(route.segments[0].cost.customs, CUSTOMS_SURCHARGE);
    }

    #[test]
    fn empty_path_yields_zero_segments_and_unit_reliability() {
        let store = two_node_store(false);
        let route = build_route(&store, &["a".to_string()]);
        assert!(route.segments.is_empty());
        assert_eq!(route.reliability, 1.0);
        assert_eq!(route.total_cost.total, 0.0);
    }

    #[test]
    fn missing_edge_between_adjacent_pair_is_skipped() {
        let store = two_node_store(false);
        // "b" -> "a" has no edge; this pair should be silently dropped.
        let route = build_route(&store, &["b".to_string(), "a".to_string()]);
        assert!(route.segments.is_empty());
    }
}
