//! Network Store
//!
//! In-memory directed multi-graph of the transport network: nodes,
//! edges, and an insertion-ordered adjacency index. Single-writer;
//! callers are responsible for serializing mutation against concurrent
//! reads (see module docs on `engine`).

use std::collections::HashMap;
use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of physical or logical place a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Hub,
    Port,
    Airport,
    Warehouse,
    Depot,
    RailTerminal,
    Origin,
    Destination,
    TransferPoint,
    Customs,
}

/// Transport mode of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    Road,
    Rail,
    Sea,
    Air,
    Intermodal,
}

/// Daily operating window for a node, as wall-clock `HH:MM` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingHours {
    pub open: String,
    pub close: String,
}

/// A place in the transport network (hub, port, airport, warehouse, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub lat: f64,
    pub lng: f64,
    pub capacity: Option<f64>,
    pub fixed_costs: Option<Decimal>,
    pub dwell_time: f64,
    pub operating_hours: Option<OperatingHours>,
    pub facilities: HashSet<String>,
    pub customs_required: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType, lat: f64, lng: f64) -> Self {
        Node {
            id: id.into(),
            name: name.into(),
            node_type,
            lat,
            lng,
            capacity: None,
            fixed_costs: None,
            dwell_time: 0.0,
            operating_hours: None,
            facilities: HashSet::new(),
            customs_required: false,
        }
    }
}

/// A directed leg of the transport network between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub mode: EdgeMode,
    pub distance: f64,
    pub base_time: f64,
    pub base_cost: Decimal,
    pub capacity: f64,
    pub reliability: f64,
    pub carbon_emissions: f64,
    pub fuel_cost: Decimal,
    pub toll_cost: Option<Decimal>,
    pub speed_limit: Option<f64>,
    pub road_quality: Option<f64>,
}

/// Aggregate statistics over the current store contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub avg_out_degree: f64,
    pub mode_histogram: HashMap<EdgeMode, usize>,
}

/// In-memory directed multi-graph with a stable, insertion-ordered
/// adjacency index. Parallel edges between the same pair of nodes are
/// permitted and are never deduplicated.
#[derive(Debug, Default)]
pub struct NetworkStore {
    nodes: HashMap<String, Node>,
    edges: HashMap<String, Edge>,
    adjacency: HashMap<String, Vec<String>>,
}

impl NetworkStore {
    pub fn new() -> Self {
        NetworkStore {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            adjacency: HashMap::new(),
        }
    }

    /// Upsert a node by id. Creates an empty adjacency slot if absent.
    pub fn add_node(&mut self, node: Node) {
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.adjacency.entry(id).or_default();
    }

    /// Append an edge to its source's adjacency list. Does not validate
    /// that either endpoint already exists; lookups tolerate absence.
    pub fn add_edge(&mut self, edge: Edge) {
        let source = edge.source.clone();
        let id = edge.id.clone();
        self.edges.insert(id.clone(), edge);
        self.adjacency.entry(source).or_default().push(id);
    }

    /// Remove a node and every edge touching it (as source or target).
    /// Adjacency lists are cleaned eagerly so reads never observe a
    /// dangling edge.
    pub fn remove_node(&mut self, id: &str) {
        if self.nodes.remove(id).is_none() {
            return;
        }
        self.adjacency.remove(id);

        let dangling: Vec<String> = self
            .edges
            .values()
            .filter(|e| e.source == id || e.target == id)
            .map(|e| e.id.clone())
            .collect();

        for edge_id in dangling {
            self.edges.remove(&edge_id);
            for list in self.adjacency.values_mut() {
                list.retain(|e| e != &edge_id);
            }
        }
    }

    /// Remove a single edge from the edge index and its source's
    /// adjacency list.
    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        if let Some(list) = self.adjacency.get_mut(&edge.source) {
            list.retain(|e| e != id);
        }
        Some(edge)
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Outgoing (target node, edge) pairs in adjacency (insertion)
    /// order, skipping any edge whose target is no longer present.
    pub fn get_neighbors(&self, id: &str) -> Vec<(&Node, &Edge)> {
        let Some(edge_ids) = self.adjacency.get(id) else {
            return Vec::new();
        };

        edge_ids
            .iter()
            .filter_map(|eid| self.edges.get(eid))
            .filter_map(|edge| self.nodes.get(&edge.target).map(|n| (n, edge)))
            .collect()
    }

    /// Incoming edges: those whose `target` equals `id`, in edge-index
    /// iteration order. Only outgoing adjacency order is contractual;
    /// incoming traversal order is unspecified.
    pub fn get_incoming(&self, id: &str) -> Vec<(&Node, &Edge)> {
        self.edges
            .values()
            .filter(|e| e.target == id)
            .filter_map(|edge| self.nodes.get(&edge.source).map(|n| (n, edge)))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn get_stats(&self) -> NetworkStats {
        let node_count = self.nodes.len();
        let edge_count = self.edges.len();
        let avg_out_degree = if node_count > 0 {
            edge_count as f64 / node_count as f64
        } else {
            0.0
        };

        let mut mode_histogram: HashMap<EdgeMode, usize> = HashMap::new();
        for edge in self.edges.values() {
            *mode_histogram.entry(edge.mode).or_insert(0) += 1;
        }

        NetworkStats {
            node_count,
            edge_count,
            avg_out_degree,
            mode_histogram,
        }
    }
}
