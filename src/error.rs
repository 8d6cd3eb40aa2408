//! Kernel error taxonomy
//!
//! Mirrors the error codes the (out-of-scope) HTTP façade maps to status
//! codes: `NoRouteFound` -> 404, `InvalidInput`/`InvalidScenario` -> 400,
//! `Internal` -> 500. An unsatisfiable constraint set has no variant of
//! its own; it is surfaced to callers as `NoRouteFound`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("no route found between the given nodes")]
    NoRouteFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type KernelResult<T> = Result<T, KernelError>;
