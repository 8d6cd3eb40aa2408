//! Routing Kernel Demo
//!
//! Seeds a small canonical multi-modal network and exercises the four
//! operational queries (optimize, scenario, Pareto frontier,
//! disruption re-route) end to end. This is a local demonstration
//! harness, not the HTTP/WebSocket surface — it never binds a socket.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use routing_kernel::config::KernelConfig;
use routing_kernel::cost::Weights;
use routing_kernel::engine::{OptimizationEngine, RouteConfig, Scenario};
use routing_kernel::network::{Edge, EdgeMode, NetworkStore, Node, NodeType};

fn seed_network() -> NetworkStore {
    let mut store = NetworkStore::new();

    store.add_node(Node::new("ny-hub", "New York Hub", NodeType::Hub, 40.7128, -74.0060));
    store.add_node(Node::new("la-hub", "Los Angeles Hub", NodeType::Hub, 34.0522, -118.2437));
    store.add_node(Node::new("chicago-hub", "Chicago Hub", NodeType::Hub, 41.8781, -87.6298));
    store.add_node(Node::new("atlanta-hub", "Atlanta Hub", NodeType::Hub, 33.7490, -84.3880));
    store.add_node(Node::new("dallas-hub", "Dallas Hub", NodeType::Hub, 32.7767, -96.7970));
    store.add_node(Node::new("seattle-hub", "Seattle Hub", NodeType::Hub, 47.6062, -122.3321));
    store.add_node(Node::new("la-port", "Port of Los Angeles", NodeType::Port, 33.7395, -118.2610));
    store.add_node(Node::new("ny-port", "Port of New York", NodeType::Port, 40.6700, -74.0400));
    store.add_node(Node::new("jfk-airport", "JFK Airport", NodeType::Airport, 40.6413, -73.7781));
    store.add_node(Node::new("lax-airport", "LAX Airport", NodeType::Airport, 33.9416, -118.4085));
    store.add_node(Node::new("chicago-rail", "Chicago Rail Terminal", NodeType::RailTerminal, 41.8500, -87.6500));
    store.add_node(Node::new("memphis-warehouse", "Memphis Warehouse", NodeType::Warehouse, 35.1495, -90.0490));

    let road = |id: &str, source: &str, target: &str, distance: f64, hours: f64, cost: f64| Edge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        mode: EdgeMode::Road,
        distance,
        base_time: hours * 60.0,
        base_cost: Decimal::from_f64_retain(cost).unwrap_or_default(),
        capacity: 20_000.0,
        reliability: 0.92,
        carbon_emissions: 0.12,
        fuel_cost: Decimal::from_f64_retain(cost * 0.1).unwrap_or_default(),
        toll_cost: None,
        speed_limit: Some(105.0),
        road_quality: Some(0.85),
    };

    store.add_edge(road("edge-la-dallas-road", "la-hub", "dallas-hub", 2000.0, 20.0, 1800.0));
    store.add_edge(road("edge-dallas-atlanta-road", "dallas-hub", "atlanta-hub", 1280.0, 13.0, 1150.0));
    store.add_edge(road("edge-atlanta-ny-road", "atlanta-hub", "ny-hub", 1200.0, 12.0, 1100.0));
    store.add_edge(road("edge-atlanta-chicago-road", "atlanta-hub", "chicago-hub", 950.0, 10.0, 900.0));
    store.add_edge(road("edge-chicago-ny-road", "chicago-hub", "ny-hub", 1150.0, 12.0, 1050.0));
    store.add_edge(road("edge-ny-chicago-road", "ny-hub", "chicago-hub", 1150.0, 12.0, 1050.0));
    store.add_edge(road("edge-chicago-la-road", "chicago-hub", "la-hub", 2800.0, 28.0, 2500.0));
    store.add_edge(road("edge-seattle-la-road", "seattle-hub", "la-hub", 1900.0, 19.0, 1700.0));
    store.add_edge(road("edge-memphis-atlanta-road", "memphis-warehouse", "atlanta-hub", 600.0, 6.0, 550.0));

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
        base_time: 14.0 * 24.0 * 60.0,
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::builder().with_default_directive(Level::INFO.into()).from_env_lossy())
        .init();

    info!("Starting routing kernel demo");

    let config = KernelConfig::from_env()?;
    info!(default_algorithm = ?config.default_algorithm, pareto_grid_steps = config.pareto_grid_steps, "Configuration loaded");

    let store = Arc::new(RwLock::new(seed_network()));
    {
        let store = store.read().await;
        info!(nodes = store.node_count(), edges = store.edge_count(), "Network seeded");
    }

    let engine = OptimizationEngine::new();

    {
        let store = store.read().await;
        match engine.optimize_route(&store, "la-hub", "ny-hub", None, RouteConfig::default(), Weights::default()) {
            Ok(route) => info!(segments = route.segments.len(), cost = route.total_cost.total, "Optimized la-hub -> ny-hub"),
            Err(e) => info!(error = %e, "No route la-hub -> ny-hub"),
        }

        match engine.scenario_route(&store, "la-port", "ny-port", Scenario::Greenest) {
            Ok(route) => info!(segments = route.segments.len(), carbon = route.total_carbon, "Greenest la-port -> ny-port"),
            Err(e) => info!(error = %e, "No route la-port -> ny-port"),
        }

        let pareto = engine.pareto_frontier(&store, "la-hub", "ny-hub", None);
        info!(
            candidates = pareto.candidates.len(),
            optimal = pareto.candidates.iter().filter(|c| c.is_optimal).count(),
            points = pareto.total_points_evaluated,
            "Pareto frontier la-hub -> ny-hub"
        );
    }

    {
        let mut store = store.write().await;
        if let Ok(original) = engine.optimize_route(&store, "ny-hub", "la-hub", None, RouteConfig::default(), Weights::new(0.0, 1.0, 0.0, 0.0, 0.0)) {
            match engine.reoptimize(&mut store, &original, "ny-hub", &["edge-chicago-ny-road".to_string()]) {
                Ok(Some(route)) => info!(segments = route.segments.len(), "Re-routed around disruption"),
                Ok(None) => info!("No alternative route found after disruption"),
                Err(e) => info!(error = %e, "Reoptimize failed"),
            }
            info!(restored = store.get_edge("edge-chicago-ny-road").is_some(), "Disrupted edge restored");
        }
    }

    Ok(())
}
