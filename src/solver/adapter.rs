// Solver adapter: the single blocking point of the pipeline. Runs the
// backend on a blocking thread under a caller-supplied time budget and
// normalizes its outcomes for the interpreter.

use crate::domain::{LpBackend, LpModel, SolveOutcome, SolveStats};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Outcome of one bounded solve attempt
#[derive(Debug, Clone)]
pub enum AdapterOutcome {
    Optimal {
        values: Vec<f64>,
        objective: f64,
        stats: SolveStats,
    },
    Infeasible,
    Timeout,
    SolverError { detail: String },
}

/// Stateless wrapper around a pluggable backend; each call is independent,
/// so one adapter can serve concurrent requests.
#[derive(Clone)]
pub struct SolverAdapter {
    backend: Arc<dyn LpBackend>,
}

impl SolverAdapter {
    pub fn new(backend: Arc<dyn LpBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> String {
        self.backend.name().to_string()
    }

    /// Solve within `budget`. On timeout the blocking task is abandoned and
    /// no partial solution is read; the caller gets `Timeout` immediately.
    pub async fn solve(
        &self,
        model: &LpModel,
        warm_start: Option<Vec<f64>>,
        budget: Duration,
    ) -> AdapterOutcome {
        let backend = Arc::clone(&self.backend);
        let model = model.clone();
        let handle =
            tokio::task::spawn_blocking(move || backend.solve(&model, warm_start.as_deref()));

        let joined = match tokio::time::timeout(budget, handle).await {
            Err(_) => {
                warn!(budget_ms = budget.as_millis() as u64, "solve timed out");
                return AdapterOutcome::Timeout;
            }
            Ok(joined) => joined,
        };

        match joined {
            Err(join_error) => AdapterOutcome::SolverError {
                detail: join_error.to_string(),
            },
            Ok(Err(solver_error)) => AdapterOutcome::SolverError {
                detail: solver_error.to_string(),
            },
            Ok(Ok(SolveOutcome::Optimal {
                values,
                objective,
                stats,
            })) => {
                debug!(
                    objective,
                    solve_ms = stats.solve_time.as_millis() as u64,
                    "optimal point found"
                );
                AdapterOutcome::Optimal {
                    values,
                    objective,
                    stats,
                }
            }
            Ok(Ok(SolveOutcome::Infeasible)) => AdapterOutcome::Infeasible,
            Ok(Ok(SolveOutcome::Unbounded)) => {
                // Every variable carries a finite upper bound, so this can
                // only mean a model inconsistency in the backend.
                error!("backend reported unbounded on a fully bounded model");
                AdapterOutcome::SolverError {
                    detail: "backend reported unbounded on a fully bounded model".to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConstraintFamily, ConstraintRow, Relation, SolverError, VariableBounds};

    struct StubBackend {
        outcome: fn() -> crate::domain::Result<SolveOutcome>,
        delay: Duration,
    }

    impl LpBackend for StubBackend {
        fn solve(
            &self,
            _model: &LpModel,
            _warm_start: Option<&[f64]>,
        ) -> crate::domain::Result<SolveOutcome> {
            std::thread::sleep(self.delay);
            (self.outcome)()
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn model() -> LpModel {
        LpModel {
            variables: vec![VariableBounds {
                name: "a".into(),
                lower: 0.0,
                upper: 1.0,
            }],
            rows: vec![ConstraintRow::new(
                vec![1.0],
                Relation::Le,
                1.0,
                "cap",
                ConstraintFamily::Percentage,
            )],
            objective: vec![1.0],
        }
    }

    fn adapter(outcome: fn() -> crate::domain::Result<SolveOutcome>, delay: Duration) -> SolverAdapter {
        SolverAdapter::new(Arc::new(StubBackend { outcome, delay }))
    }

    #[tokio::test]
    async fn exhausted_budget_surfaces_as_timeout() {
        let adapter = adapter(
            || Ok(SolveOutcome::Infeasible),
            Duration::from_millis(500),
        );
        let outcome = adapter
            .solve(&model(), None, Duration::from_millis(10))
            .await;
        assert!(matches!(outcome, AdapterOutcome::Timeout));
    }

    #[tokio::test]
    async fn unbounded_is_treated_as_a_solver_error() {
        let adapter = adapter(|| Ok(SolveOutcome::Unbounded), Duration::ZERO);
        let outcome = adapter.solve(&model(), None, Duration::from_secs(1)).await;
        assert!(matches!(outcome, AdapterOutcome::SolverError { .. }));
    }

    #[tokio::test]
    async fn optimal_outcomes_carry_backend_stats() {
        let adapter = adapter(
            || {
                Ok(SolveOutcome::Optimal {
                    values: vec![1.0],
                    objective: 1.0,
                    stats: SolveStats {
                        solve_time: Duration::from_millis(7),
                    },
                })
            },
            Duration::ZERO,
        );
        let outcome = adapter.solve(&model(), None, Duration::from_secs(1)).await;
        match outcome {
            AdapterOutcome::Optimal { stats, .. } => {
                assert_eq!(stats.solve_time, Duration::from_millis(7));
            }
            other => panic!("expected optimal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn backend_errors_carry_their_detail() {
        let adapter = adapter(
            || Err(SolverError::ExecutionFailed("numerical trouble".into())),
            Duration::ZERO,
        );
        let outcome = adapter.solve(&model(), None, Duration::from_secs(1)).await;
        match outcome {
            AdapterOutcome::SolverError { detail } => {
                assert!(detail.contains("numerical trouble"))
            }
            other => panic!("expected solver error, got {other:?}"),
        }
    }
}
