//! Routing Kernel
//!
//! The routing kernel for a multi-modal logistics network: an
//! in-memory directed graph store, a pure scalarized edge-cost
//! function, three path solvers, route materialization with cost
//! breakdowns and reliability aggregates, and an optimization engine
//! that answers the system's four operational queries (single optimal
//! route, named scenario, Pareto frontier, disruption re-route).
//!
//! The HTTP/WebSocket surface, persistence, sample-data seeding,
//! export/reporting, notifications, and authentication are external
//! collaborators and live outside this crate.

pub mod config;
pub mod cost;
pub mod engine;
pub mod error;
pub mod network;
pub mod route;
pub mod solvers;

pub use config::KernelConfig;
pub use cost::Weights;
pub use engine::{Constraints, OptimizationEngine, ParetoResult, RouteConfig, Scenario};
pub use error::{KernelError, KernelResult};
pub use network::{Edge, EdgeMode, Node, NodeType, NetworkStore};
pub use route::Route;
pub use solvers::Algorithm;
