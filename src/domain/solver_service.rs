// Domain service interface for the LP solving routine
// The core formulates and interprets; the backend is a black box behind
// this contract, so any LP/MILP-capable engine can be substituted.

use super::models::LpModel;
use std::time::Duration;

/// Error types raised by a solver backend
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Timing a backend measured for one solve call
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolveStats {
    pub solve_time: Duration,
}

/// Raw outcome of one backend solve
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Optimal {
        values: Vec<f64>,
        objective: f64,
        stats: SolveStats,
    },
    Infeasible,
    /// Cannot legitimately occur with finite variable bounds; the adapter
    /// treats it as a model inconsistency
    Unbounded,
}

/// Contract every LP backend must satisfy
///
/// Backends are stateless across calls: each invocation is independent,
/// which keeps concurrent solves across alloy targets safe.
pub trait LpBackend: Send + Sync {
    /// Solve the normalized model. `warm_start` is a hint the backend may
    /// use to speed convergence where it supports one; it need not be
    /// feasible and may be ignored.
    fn solve(&self, model: &LpModel, warm_start: Option<&[f64]>) -> Result<SolveOutcome>;

    /// Validate a model without solving it
    fn validate(&self, model: &LpModel) -> Result<()> {
        let mut errors = Vec::new();

        let num_vars = model.num_variables();
        if num_vars == 0 {
            errors.push("Model has no variables".to_string());
        }

        if model.objective.len() != num_vars {
            errors.push(format!(
                "Objective has {} coefficients but model has {} variables",
                model.objective.len(),
                num_vars
            ));
        }

        for (i, row) in model.rows.iter().enumerate() {
            if row.coefficients.len() != num_vars {
                errors.push(format!(
                    "Row {} ('{}') has {} coefficients but model has {} variables",
                    i,
                    row.tag,
                    row.coefficients.len(),
                    num_vars
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidModel(errors.join("; ")))
        }
    }

    /// Name of this backend
    fn name(&self) -> &str;
}
