//! Optimization Engine
//!
//! Orchestrates algorithm selection, constraint validation and its
//! one-shot relaxed-weight fallback, Pareto frontier enumeration, named
//! scenario presets, and the disruption re-routing protocol. This is
//! the only component that mutates the `NetworkStore` (during
//! disruption routing) and the only one with knowledge of all the
//! others.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cost::Weights;
use crate::error::{KernelError, KernelResult};
use crate::network::NetworkStore;
use crate::route::{build_route, ConfidenceBand, Route, RouteMetadata};
use crate::solvers::{astar, bidirectional, dijkstra, Algorithm};

/// A hard time window a route must fit inside, or a soft preference
/// recorded for informational purposes only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub hard_constraint: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapacityConstraint {
    pub max_weight: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmissionsConstraint {
    pub max_co2: f64,
    pub prefer_low_emission: bool,
}

/// Hard and soft constraints a route is validated against. All fields
/// other than `time_windows`/`capacity`/`emissions`/`avoid_nodes`/
/// `required_nodes` are informational and never cause rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    pub time_windows: Vec<TimeWindow>,
    pub capacity: Option<CapacityConstraint>,
    pub emissions: Option<EmissionsConstraint>,
    pub avoid_nodes: Vec<String>,
    pub required_nodes: Vec<String>,
}

/// Per-query solve configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteConfig {
    pub algorithm: Algorithm,
    pub consider_traffic: bool,
    pub consider_weather: bool,
    pub stochastic: bool,
    pub confidence_level: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        RouteConfig {
            algorithm: Algorithm::Hybrid,
            consider_traffic: true,
            consider_weather: true,
            stochastic: false,
            confidence_level: 0.95,
        }
    }
}

/// The four named scenario presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    LowestCost,
    Fastest,
    Greenest,
    MostReliable,
}

impl Scenario {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "lowest_cost" => Some(Scenario::LowestCost),
            "fastest" => Some(Scenario::Fastest),
            "greenest" => Some(Scenario::Greenest),
            "most_reliable" => Some(Scenario::MostReliable),
            _ => None,
        }
    }

    fn weights(&self) -> Weights {
        match self {
            Scenario::LowestCost => Weights::new(1.0, 0.0, 0.0, 0.0, 0.0),
            Scenario::Fastest => Weights::new(0.0, 1.0, 0.0, 0.0, 0.0),
            Scenario::Greenest => Weights::new(0.0, 0.0, 1.0, 0.0, 0.0),
            Scenario::MostReliable => Weights::new(0.1, 0.1, 0.0, 0.5, 0.3),
        }
    }

    fn config(&self) -> RouteConfig {
        match self {
            Scenario::LowestCost => RouteConfig { algorithm: Algorithm::Dijkstra, stochastic: false, ..Default::default() },
            Scenario::Fastest => RouteConfig { algorithm: Algorithm::AStar, stochastic: false, ..Default::default() },
            Scenario::Greenest => RouteConfig { algorithm: Algorithm::Dijkstra, stochastic: false, ..Default::default() },
            Scenario::MostReliable => RouteConfig {
                algorithm: Algorithm::Hybrid,
                stochastic: true,
                confidence_level: 0.95,
                ..Default::default()
            },
        }
    }
}

/// One candidate in a Pareto frontier, together with its dominance
/// verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoCandidate {
    pub route: Route,
    pub is_optimal: bool,
}

/// Result of a Pareto frontier query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoResult {
    pub candidates: Vec<ParetoCandidate>,
    pub total_points_evaluated: usize,
    pub elapsed_ms: u64,
}

fn z_for_level(level: f64) -> f64 {
    if (level - 0.90).abs() < 1e-9 {
        1.645
    } else if (level - 0.99).abs() < 1e-9 {
        2.576
    } else {
        1.96
    }
}

/// Orchestrates the routing kernel's four operational queries. Holds
/// no state of its own beyond wiring; all graph data lives in the
/// caller-supplied `NetworkStore`.
#[derive(Debug, Default)]
pub struct OptimizationEngine;

impl OptimizationEngine {
    pub fn new() -> Self {
        OptimizationEngine
    }

    fn dispatch(store: &NetworkStore, start: &str, goal: &str, weights: &Weights, algorithm: Algorithm) -> Option<Vec<String>> {
        match algorithm {
            Algorithm::AStar => astar(store, start, goal, weights),
            Algorithm::Dijkstra => dijkstra(store, start, goal, weights),
            Algorithm::Bidirectional => bidirectional(store, start, goal),
            Algorithm::Hybrid => astar(store, start, goal, weights).or_else(|| dijkstra(store, start, goal, weights)),
        }
    }

    fn attach_confidence(route: &mut Route, config: &RouteConfig) {
        if !config.stochastic {
            return;
        }
        let unreliability = 1.0 - route.reliability;
        let var_time = route.total_time * unreliability * 0.3;
        let var_cost = route.total_cost.total * unreliability * 0.2;
        let z = z_for_level(config.confidence_level);

        route.confidence = Some(ConfidenceBand {
            level: config.confidence_level,
            time_min: (route.total_time - z * var_time.sqrt()).max(0.0),
            time_max: route.total_time + z * var_time.sqrt(),
            cost_min: (route.total_cost.total - z * var_cost.sqrt()).max(0.0),
            cost_max: route.total_cost.total + z * var_cost.sqrt(),
        });
    }

    /// Validate a route against hard and soft constraints. Returns
    /// `true` iff every hard constraint is satisfied.
    pub fn validate_constraints(route: &Route, constraints: &Constraints) -> bool {
        for window in &constraints.time_windows {
            if window.hard_constraint {
                let allowed_ms = (window.end - window.start).num_milliseconds() as f64;
                if route.total_time * 60_000.0 > allowed_ms {
                    return false;
                }
            }
        }

        if let Some(capacity) = &constraints.capacity {
            let under_capacity = route
                .segments
                .iter()
                .any(|s| s.edge.capacity < capacity.max_weight);
            if under_capacity {
                return false;
            }
        }

        if let Some(emissions) = &constraints.emissions {
            if route.total_carbon > emissions.max_co2 && !emissions.prefer_low_emission {
                return false;
            }
        }

        for node_id in &constraints.avoid_nodes {
            let touched = route
                .segments
                .iter()
                .any(|s| &s.from.id == node_id || &s.to.id == node_id);
            if touched {
                return false;
            }
        }

        for required in &constraints.required_nodes {
            let visited = route
                .segments
                .iter()
                .any(|s| &s.from.id == required || &s.to.id == required);
            if !visited {
                return false;
            }
        }

        true
    }

    /// Single optimal route under caller weights and constraints.
    pub fn optimize_route(
        &self,
        store: &NetworkStore,
        start: &str,
        goal: &str,
        constraints: Option<Constraints>,
        config: RouteConfig,
        weights: Weights,
    ) -> KernelResult<Route> {
        let start_time = Instant::now();

        let Some(path) = Self::dispatch(store, start, goal, &weights, config.algorithm) else {
            tracing::debug!(start, goal, algorithm = ?config.algorithm, "no path found");
            return Err(KernelError::NoRouteFound);
        };

        let mut route = build_route(store, &path);
        route.constraints = constraints.clone();

        let valid = match &constraints {
            Some(c) => Self::validate_constraints(&route, c),
            None => true,
        };

        if valid {
            Self::attach_confidence(&mut route, &config);
            route.metadata = Some(RouteMetadata {
                algorithm: config.algorithm,
                compute_time_ms: start_time.elapsed().as_millis() as u64,
                alternatives_considered: 1,
            });
            return Ok(route);
        }

        tracing::warn!(start, goal, "route failed constraint validation; attempting relaxed-weight fallback");

        let relaxed = weights.relaxed();
        let Some(fallback_path) = dijkstra(store, start, goal, &relaxed) else {
            return Err(KernelError::NoRouteFound);
        };

        let mut fallback_route = build_route(store, &fallback_path);
        fallback_route.constraints = constraints;
        fallback_route.metadata = Some(RouteMetadata {
            algorithm: Algorithm::Dijkstra,
            compute_time_ms: start_time.elapsed().as_millis() as u64,
            alternatives_considered: 1,
        });
        // The fallback is best-effort and is returned without
        // re-validating constraints.
        Ok(fallback_route)
    }

    /// Named scenario query.
    pub fn scenario_route(&self, store: &NetworkStore, start: &str, goal: &str, scenario: Scenario) -> KernelResult<Route> {
        self.optimize_route(store, start, goal, None, scenario.config(), scenario.weights())
    }

    /// Enumerate the 56-point weight simplex over `{cost, time,
    /// carbon}` with `risk`/`serviceLevel` splitting the remainder, and
    /// filter to the Pareto frontier over `(cost, time, carbon, risk)`
    /// Fans the independent solves out over a `rayon` thread pool;
    /// the store is read-only for the whole operation.
    pub fn pareto_frontier(&self, store: &NetworkStore, start: &str, goal: &str, constraints: Option<Constraints>) -> ParetoResult {
        let start_time = Instant::now();
        const STEPS: i64 = 5;

        let mut grid = Vec::new();
        for i in 0..=STEPS {
            for j in 0..=(STEPS - i) {
                for k in 0..=(STEPS - i - j) {
                    let cost = i as f64 / STEPS as f64;
                    let time = j as f64 / STEPS as f64;
                    let carbon = k as f64 / STEPS as f64;
                    let remaining = 1.0 - cost - time - carbon;
                    let risk = remaining * 0.5;
                    let service_level = remaining * 0.5;
                    grid.push(Weights::new(cost, time, carbon, risk, service_level));
                }
            }
        }

        let total_points_evaluated = grid.len();

        let config = RouteConfig {
            algorithm: Algorithm::Hybrid,
            consider_traffic: true,
            consider_weather: true,
            stochastic: false,
            confidence_level: 0.95,
        };

        let routes: Vec<Route> = grid
            .into_par_iter()
            .filter_map(|weights| {
                self.optimize_route(store, start, goal, constraints.clone(), config, weights).ok()
            })
            .collect();

        let dominated: Vec<bool> = routes
            .iter()
            .map(|candidate| routes.iter().any(|other| dominates(other, candidate)))
            .collect();

        let candidates = routes
            .into_iter()
            .zip(dominated)
            .map(|(route, is_dominated)| ParetoCandidate { route, is_optimal: !is_dominated })
            .collect();

        ParetoResult {
            candidates,
            total_points_evaluated,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Disruption re-routing. Snapshots and removes the disrupted
    /// edges, solves from `current_position` to the original route's
    /// destination, then restores every snapshotted edge regardless of
    /// solve outcome.
    pub fn reoptimize(
        &self,
        store: &mut NetworkStore,
        current_route: &Route,
        current_position: &str,
        disrupted_edges: &[String],
    ) -> KernelResult<Option<Route>> {
        let Some(destination) = current_route.segments.last().map(|s| s.to.id.clone()) else {
            return Err(KernelError::InvalidInput("current route has no segments".to_string()));
        };

        let snapshots: Vec<_> = disrupted_edges
            .iter()
            .filter_map(|id| store.get_edge(id).cloned())
            .collect();

        for id in disrupted_edges {
            store.remove_edge(id);
        }

        let weights = Weights::new(0.4, 0.6, 0.0, 0.0, 0.0);
        let config = RouteConfig { algorithm: Algorithm::Hybrid, stochastic: false, ..Default::default() };

        let result = self.optimize_route(
            store,
            current_position,
            &destination,
            current_route.constraints.clone(),
            config,
            weights,
        );

        for edge in snapshots {
            store.add_edge(edge);
        }

        match result {
            Ok(route) => Ok(Some(route)),
            Err(KernelError::NoRouteFound) => Ok(None),
            Err(other) => Err(other),
        }
    }
}

/// `a` dominates `b` over `(cost, time, carbon, risk)` iff every
/// objective of `a` is <= that of `b` and at least one is strictly <.
fn dominates(a: &Route, b: &Route) -> bool {
    let le = a.total_cost.total <= b.total_cost.total
        && a.total_time <= b.total_time
        && a.total_carbon <= b.total_carbon
        && a.risk_score <= b.risk_score;

    let lt = a.total_cost.total < b.total_cost.total
        || a.total_time < b.total_time
        || a.total_carbon < b.total_carbon
        || a.risk_score < b.risk_score;

    le && lt
}
