//! Path Solvers
//!
//! Three pathfinders sharing a small interface
//! (`start, goal, store, weights -> Option<Vec<NodeId>>`) but no shared
//! state, following the tagged-variant dispatch the optimization engine
//! uses to pick between them. The open-set orderings carry a monotonic
//! insertion sequence so `BinaryHeap` tie-breaks deterministically by
//! discovery order, generalizing the reverse-for-min-heap `SearchState`
//! pattern this kernel's k-shortest-paths ancestor used for a single
//! best-first frontier.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cost::{edge_cost, heuristic, Weights};
use crate::network::NetworkStore;

/// Which solver the engine should dispatch to. Unrecognized values at
/// the boundary default to `AStar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    AStar,
    Dijkstra,
    Bidirectional,
    Hybrid,
}

impl FromStr for Algorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "astar" => Ok(Algorithm::AStar),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "bidirectional" => Ok(Algorithm::Bidirectional),
            "hybrid" => Ok(Algorithm::Hybrid),
            _ => Err(()),
        }
    }
}

#[derive(Clone)]
struct Frontier {
    f: f64,
    seq: u64,
    node: String,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}
impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the lowest f pops first.
        // Ties broken by insertion order (lower seq first).
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn reconstruct(predecessors: &HashMap<String, String>, start: &str, goal: &str) -> Vec<String> {
    let mut path = vec![goal.to_string()];
    let mut current = goal.to_string();
    while current != start {
        match predecessors.get(&current) {
            Some(prev) => {
                path.push(prev.clone());
                current = prev.clone();
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Best-first search with the great-circle heuristic. Expands the
/// lowest `f = g + h` node; tie-breaks by insertion order.
pub fn astar(store: &NetworkStore, start: &str, goal: &str, weights: &Weights) -> Option<Vec<String>> {
    if start == goal {
        return store.has_node(start).then(|| vec![start.to_string()]);
    }
    if !store.has_node(start) || !store.has_node(goal) {
        return None;
    }

    let goal_node = store.get_node(goal)?;

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<String, f64> = HashMap::new();
    let mut predecessors: HashMap<String, String> = HashMap::new();
    let mut seq: u64 = 0;

    g_score.insert(start.to_string(), 0.0);
    open.push(Frontier { f: 0.0, seq, node: start.to_string() });

    let mut closed: HashSet<String> = HashSet::new();

    while let Some(current) = open.pop() {
        if current.node == goal {
            return Some(reconstruct(&predecessors, start, goal));
        }
        if closed.contains(&current.node) {
            continue;
        }
        closed.insert(current.node.clone());

        let current_g = *g_score.get(&current.node).unwrap_or(&f64::INFINITY);

        for (neighbor, edge) in store.get_neighbors(&current.node) {
            let tentative_g = current_g + edge_cost(edge, weights);
            let best_known = g_score.get(&neighbor.id).copied().unwrap_or(f64::INFINITY);
            if tentative_g < best_known {
                g_score.insert(neighbor.id.clone(), tentative_g);
                predecessors.insert(neighbor.id.clone(), current.node.clone());
                let h = heuristic(neighbor, goal_node, weights);
                seq += 1;
                open.push(Frontier { f: tentative_g + h, seq, node: neighbor.id.clone() });
            }
        }
    }

    None
}

/// Non-negative single-source shortest path. Never revisits a
/// finalized node; terminates on reaching `goal` or when the minimum
/// remaining distance is infinite (disconnected).
pub fn dijkstra(store: &NetworkStore, start: &str, goal: &str, weights: &Weights) -> Option<Vec<String>> {
    if start == goal {
        return store.has_node(start).then(|| vec![start.to_string()]);
    }
    if !store.has_node(start) || !store.has_node(goal) {
        return None;
    }

    let mut dist: HashMap<String, f64> = HashMap::new();
    let mut predecessors: HashMap<String, String> = HashMap::new();
    let mut finalized: HashSet<String> = HashSet::new();
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;

    dist.insert(start.to_string(), 0.0);
    open.push(Frontier { f: 0.0, seq, node: start.to_string() });

    while let Some(current) = open.pop() {
        if finalized.contains(&current.node) {
            continue;
        }
        finalized.insert(current.node.clone());

        if current.node == goal {
            return Some(reconstruct(&predecessors, start, goal));
        }

        let current_dist = *dist.get(&current.node).unwrap_or(&f64::INFINITY);
        if current_dist.is_infinite() {
            break;
        }

        for (neighbor, edge) in store.get_neighbors(&current.node) {
            if finalized.contains(&neighbor.id) {
                continue;
            }
            let candidate = current_dist + edge_cost(edge, weights);
            let best_known = dist.get(&neighbor.id).copied().unwrap_or(f64::INFINITY);
            if candidate < best_known {
                dist.insert(neighbor.id.clone(), candidate);
                predecessors.insert(neighbor.id.clone(), current.node.clone());
                seq += 1;
                open.push(Frontier { f: candidate, seq, node: neighbor.id.clone() });
            }
        }
    }

    None
}

/// Bidirectional BFS-style meet. Treats the graph as unweighted for
/// reachability: forward expansion follows outgoing edges, backward
/// expansion follows incoming edges, alternating one step each in FIFO
/// order. Exposed as a fast existence/reachability check; the
/// stitched path is NOT guaranteed minimum-cost under the directed
/// multi-graph.
pub fn bidirectional(store: &NetworkStore, start: &str, goal: &str) -> Option<Vec<String>> {
    if start == goal {
        return store.has_node(start).then(|| vec![start.to_string()]);
    }
    if !store.has_node(start) || !store.has_node(goal) {
        return None;
    }

    let mut forward_pred: HashMap<String, String> = HashMap::new();
    let mut backward_pred: HashMap<String, String> = HashMap::new();
    let mut forward_visited: HashSet<String> = HashSet::new();
    let mut backward_visited: HashSet<String> = HashSet::new();
    let mut forward_queue: VecDeque<String> = VecDeque::new();
    let mut backward_queue: VecDeque<String> = VecDeque::new();

    forward_visited.insert(start.to_string());
    forward_queue.push_back(start.to_string());
    backward_visited.insert(goal.to_string());
    backward_queue.push_back(goal.to_string());

    let meet = loop {
        if forward_queue.is_empty() && backward_queue.is_empty() {
            return None;
        }

        if let Some(node) = forward_queue.pop_front() {
            for (neighbor, _edge) in store.get_neighbors(&node) {
                if !forward_visited.contains(&neighbor.id) {
                    forward_visited.insert(neighbor.id.clone());
                    forward_pred.insert(neighbor.id.clone(), node.clone());
                    forward_queue.push_back(neighbor.id.clone());
                }
            }
            if let Some(hit) = forward_visited.intersection(&backward_visited).next() {
                break hit.clone();
            }
        }

        if let Some(node) = backward_queue.pop_front() {
            for (neighbor, _edge) in store.get_incoming(&node) {
                if !backward_visited.contains(&neighbor.id) {
                    backward_visited.insert(neighbor.id.clone());
                    backward_pred.insert(neighbor.id.clone(), node.clone());
                    backward_queue.push_back(neighbor.id.clone());
                }
            }
            if let Some(hit) = forward_visited.intersection(&backward_visited).next() {
                break hit.clone();
            }
        }
    };

    let forward_half = reconstruct(&forward_pred, start, &meet);

    let mut backward_half = vec![meet.clone()];
    let mut current = meet;
    while current != goal {
        match backward_pred.get(&current) {
            Some(next) => {
                backward_half.push(next.clone());
                current = next.clone();
            }
            None => break,
        }
    }

    let mut full = forward_half;
    full.extend(backward_half.into_iter().skip(1));
    Some(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Edge, EdgeMode, Node, NodeType};
    use rust_decimal::Decimal;

    fn build_line() -> NetworkStore {
        let mut store = NetworkStore::new();
        store.add_node(Node::new("a", "A", NodeType::Hub, 0.0, 0.0));
        store.add_node(Node::new("b", "B", NodeType::Hub, 0.0, 1.0));
        store.add_node(Node::new("c", "C", NodeType::Hub, 0.0, 2.0));
        for (id, src, tgt) in [("e1", "a", "b"), ("e2", "b", "c")] {
            store.add_edge(Edge {
                id: id.to_string(),
                source: src.to_string(),
                target: tgt.to_string(),
                mode: EdgeMode::Road,
                distance: 100.0,
                base_time: 60.0,
                base_cost: Decimal::new(1000, 2),
                capacity: 500.0,
                reliability: 0.9,
                carbon_emissions: 0.1,
                fuel_cost: Decimal::ZERO,
                toll_cost: None,
                speed_limit: None,
                road_quality: None,
            });
        }
        store
    }

    #[test]
    fn astar_finds_line_path() {
        let store = build_line();
        let weights = Weights::new(1.0, 0.0, 0.0, 0.0, 0.0);
        let path = astar(&store, "a", "c", &weights).unwrap();
        assert_eq!(path, vec!["a", "b", "c"]);
    }

    #[test]
    fn dijkstra_finds_line_path() {
        let store = build_line();
        let weights = Weights::new(1.0, 0.0, 0.0, 0.0, 0.0);
        let path = dijkstra(&store, "a", "c", &weights).unwrap();
        assert_eq!(path, vec!["a", "b", "c"]);
    }

    #[test]
    fn same_start_and_goal_returns_singleton() {
        let store = build_line();
        let weights = Weights::default();
        assert_eq!(astar(&store, "a", "a", &weights), Some(vec!["a".to_string()]));
        assert_eq!(dijkstra(&store, "a", "a", &weights), Some(vec!["a".to_string()]));
        assert_eq!(bidirectional(&store, "a", "a"), Some(vec!["a".to_string()]));
    }

    #[test]
    fn disconnected_nodes_return_none() {
        let mut store = build_line();
        store.add_node(Node::new("isolated", "Isolated", NodeType::Hub, 5.0, 5.0));
        let weights = Weights::default();
        assert!(astar(&store, "a", "isolated", &weights).is_none());
        assert!(dijkstra(&store, "a", "isolated", &weights).is_none());
        assert!(bidirectional(&store, "a", "isolated").is_none());
    }

    #[test]
    fn bidirectional_finds_a_connecting_path() {
        let store = build_line();
        let path = bidirectional(&store, "a", "c").unwrap();
        assert_eq!(path.first(), Some(&"a".to_string()));
        assert_eq!(path.last(), Some(&"c".to_string()));
    }
}
