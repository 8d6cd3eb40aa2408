//! Kernel Configuration
//!
//! Ambient defaults the kernel's callers can load from the environment
//! (and an optional `.env` file), following the same
//! `Config::from_env() -> Result<Self>` shape the reference crate uses
//! for its own bootstrap config. Unlike the reference, this config does
//! not carry any transport/database settings — the kernel has none of
//! its own — only the defaults an embedding application would want for
//! unconfigured queries.

use anyhow::{Context, Result};

use crate::cost::Weights;
use crate::solvers::Algorithm;

/// Default dials for callers that don't specify their own per-query.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    pub default_algorithm: Algorithm,
    pub default_weights: Weights,
    pub pareto_grid_steps: i64,
    pub log_level: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            default_algorithm: Algorithm::Hybrid,
            default_weights: Weights::default(),
            pareto_grid_steps: 5,
            log_level: "info".to_string(),
        }
    }
}

impl KernelConfig {
    /// Load overrides from the process environment (and `.env` if
    /// present), falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = KernelConfig::default();

        if let Ok(algo) = std::env::var("ROUTING_DEFAULT_ALGORITHM") {
            if let Ok(parsed) = algo.parse::<Algorithm>() {
                config.default_algorithm = parsed;
            }
        }

        if let Ok(steps) = std::env::var("ROUTING_PARETO_GRID_STEPS") {
            config.pareto_grid_steps = steps
                .parse()
                .context("ROUTING_PARETO_GRID_STEPS must be an integer")?;
        }

        if let Ok(level) = std::env::var("ROUTING_LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }
}
