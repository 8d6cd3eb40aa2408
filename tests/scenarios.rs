//! End-to-end scenario tests over the canonical seed graph.

use rust_decimal::Decimal;

use routing_kernel::cost::Weights;
use routing_kernel::engine::{OptimizationEngine, RouteConfig, Scenario};
use routing_kernel::network::{Edge, EdgeMode, NetworkStore, Node, NodeType};

fn road(id: &str, source: &str, target: &str, distance: f64, minutes: f64, cost: f64) -> Edge {
    Edge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        mode: EdgeMode::Road,
        distance,
        base_time: minutes,
        base_cost: Decimal::from_f64_retain(cost).unwrap_or_default(),
        capacity: 20_000.0,
        reliability: 0.92,
        carbon_emissions: 0.12,
        fuel_cost: Decimal::from_f64_retain(cost * 0.1).unwrap_or_default(),
        toll_cost: None,
        speed_limit: Some(105.0),
        road_quality: Some(0.85),
    }
}

fn canonical_network() -> NetworkStore {
    let mut store = NetworkStore::new();

    for (id, name, lat, lng) in [
        ("ny-hub", "New York Hub", 40.7128, -74.0060),
        ("la-hub", "Los Angeles Hub", 34.0522, -118.2437),
        ("chicago-hub", "Chicago Hub", 41.8781, -87.6298),
        ("atlanta-hub", "Atlanta Hub", 33.7490, -84.3880),
        ("dallas-hub", "Dallas Hub", 32.7767, -96.7970),
        ("seattle-hub", "Seattle Hub", 47.6062, -122.3321),
        ("la-port", "Port of Los Angeles", 33.7395, -118.2610),
        ("ny-port", "Port of New York", 40.6700, -74.0400),
        ("jfk-airport", "JFK Airport", 40.6413, -73.7781),
        ("lax-airport", "LAX Airport", 33.9416, -118.4085),
        ("chicago-rail", "Chicago Rail Terminal", 41.8500, -87.6500),
        ("memphis-warehouse", "Memphis Warehouse", 35.1495, -90.0490),
    ] {
        let node_type = if id.ends_with("-port") {
            NodeType::Port
        } else if id.ends_with("-airport") {
            NodeType::Airport
        } else if id.ends_with("-rail") {
            NodeType::RailTerminal
        } else if id.ends_with("-warehouse") {
            NodeType::Warehouse
        } else {
            NodeType::Hub
        };
        store.add_node(Node::new(id, name, node_type, lat, lng));
    }

    store.add_edge(road("edge-la-dallas-road", "la-hub", "dallas-hub", 2000.0, 1200.0, 1800.0));
    store.add_edge(road("edge-dallas-atlanta-road", "dallas-hub", "atlanta-hub", 1280.0, 780.0, 1150.0));
    store.add_edge(road("edge-atlanta-ny-road", "atlanta-hub", "ny-hub", 1200.0, 720.0, 1100.0));
    store.add_edge(road("edge-atlanta-chicago-road", "atlanta-hub", "chicago-hub", 950.0, 600.0, 900.0));
    store.add_edge(road("edge-chicago-ny-road", "chicago-hub", "ny-hub", 1150.0, 720.0, 1050.0));
    store.add_edge(road("edge-ny-chicago-road", "ny-hub", "chicago-hub", 1150.0, 720.0, 1050.0));
    store.add_edge(road("edge-chicago-la-road", "chicago-hub", "la-hub", 2800.0, 1680.0, 2500.0));

    store.add_edge(Edge {
        id: "edge-atlanta-chicagorail-rail".to_string(),
        source: "atlanta-hub".to_string(),
        target: "chicago-rail".to_string(),
        mode: EdgeMode::Rail,
        distance: 980.0,
        base_time: 780.0,
        base_cost: Decimal::new(70000, 2),
        capacity: 100_000.0,
        reliability: 0.9,
        carbon_emissions: 0.03,
        fuel_cost: Decimal::new(5000, 2),
        toll_cost: None,
        speed_limit: None,
        road_quality: None,
    });

    store.add_edge(Edge {
        id: "edge-laport-nyport-sea".to_string(),
        source: "la-port".to_string(),
        target: "ny-port".to_string(),
        mode: EdgeMode::Sea,
        distance: 13000.0,
        base_time: 20160.0,
        base_cost: Decimal::new(250000, 2),
        capacity: 500_000.0,
        reliability: 0.97,
        carbon_emissions: 0.01,
        fuel_cost: Decimal::new(20000, 2),
        toll_cost: None,
        speed_limit: None,
        road_quality: None,
    });

    store.add_edge(Edge {
        id: "edge-lax-jfk-air".to_string(),
        source: "lax-airport".to_string(),
        target: "jfk-airport".to_string(),
        mode: EdgeMode::Air,
        distance: 3983.0,
        base_time: 330.0,
        base_cost: Decimal::new(800000, 2),
        capacity: 5_000.0,
        reliability: 0.99,
        carbon_emissions: 0.6,
        fuel_cost: Decimal::new(150000, 2),
        toll_cost: None,
        speed_limit: None,
        road_quality: None,
    });

    store
}

/// Fastest lax-airport -> jfk-airport selects the single air edge.
#[test]
fn fastest_lax_to_jfk_selects_direct_air_edge() {
    let store = canonical_network();
    let engine = OptimizationEngine::new();

    let route = engine
        .scenario_route(&store, "lax-airport", "jfk-airport", Scenario::Fastest)
        .expect("route should exist");

    assert_eq!(route.segments.len(), 1);
    assert_eq!(route.segments[0].edge.id, "edge-lax-jfk-air");
    assert_eq!(route.segments[0].estimated_time, 330.0);
}

/// Greenest la-port -> ny-port selects the sea edge (lowest carbon factor).
#[test]
fn greenest_laport_to_nyport_selects_sea_edge() {
    let store = canonical_network();
    let engine = OptimizationEngine::new();

    let route = engine
        .scenario_route(&store, "la-port", "ny-port", Scenario::Greenest)
        .expect("route should exist");

    assert_eq!(route.segments.len(), 1);
    assert_eq!(route.segments[0].edge.id, "edge-laport-nyport-sea");
}

/// Reoptimizing around a disrupted edge avoids it, and the store
/// restores the edge's original fields after the call.
#[test]
fn reoptimize_avoids_disrupted_edge_and_restores_it() {
    let mut store = canonical_network();
    let engine = OptimizationEngine::new();

    let original_edge = store.get_edge("edge-chicago-ny-road").cloned().unwrap();

    let original_route = engine
        .optimize_route(&store, "ny-hub", "la-hub", None, RouteConfig::default(), Weights::new(0.0, 1.0, 0.0, 0.0, 0.0))
        .expect("initial route should exist");

    let rerouted = engine
        .reoptimize(&mut store, &original_route, "ny-hub", &["edge-chicago-ny-road".to_string()])
        .expect("reoptimize should not error");

    if let Some(route) = rerouted {
        assert!(route.segments.iter().all(|s| s.edge.id != "edge-chicago-ny-road"));
    }

    let restored_edge = store.get_edge("edge-chicago-ny-road").cloned().expect("edge must be restored");
    assert_eq!(restored_edge.distance, original_edge.distance);
    assert_eq!(restored_edge.base_cost, original_edge.base_cost);
    assert_eq!(restored_edge.mode, original_edge.mode);
}

/// An emissions ceiling with `prefer_low_emission = false` on a
/// route that exceeds it triggers the relaxed-weight fallback rather
/// than an error.
#[test]
fn emissions_ceiling_triggers_relaxed_fallback() {
    let store = canonical_network();
    let engine = OptimizationEngine::new();

    let constraints = routing_kernel::engine::Constraints {
        emissions: Some(routing_kernel::engine::EmissionsConstraint {
            max_co2: 10.0,
            prefer_low_emission: false,
        }),
        ..Default::default()
    };

    let route = engine
        .optimize_route(
            &store,
            "la-hub",
            "chicago-hub",
            Some(constraints),
            RouteConfig::default(),
            Weights::new(0.5, 0.5, 0.0, 0.0, 0.0),
        )
        .expect("fallback route should still be returned");

    assert!(!route.segments.is_empty());
}

/// Invariant: segment identity chain and componentwise cost totals
/// hold for a multi-leg route.
#[test]
fn multi_leg_route_preserves_identity_chain_and_totals() {
    let store = canonical_network();
    let engine = OptimizationEngine::new();

    let route = engine
        .scenario_route(&store, "la-hub", "ny-hub", Scenario::LowestCost)
        .expect("route should exist");

    for window in route.segments.windows(2) {
        assert_eq!(window[0].to.id, window[1].from.id);
    }

    let summed: f64 = route.segments.iter().map(|s| s.cost.total).sum();
    assert!((route.total_cost.total - summed).abs() < 1e-6);

    let expected_reliability: f64 = route.segments.iter().map(|s| s.edge.reliability).product();
    assert!((route.reliability - expected_reliability).abs() < 1e-9);
}
