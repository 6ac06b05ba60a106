// Charge optimization service: drives one request through build → seed →
// solve → interpret and reports a terminal outcome. Requests share no
// mutable state, so batch evaluation across alloy targets is embarrassingly
// parallel.

use super::builder::{InvalidData, ProblemBuilder};
use super::diagnosis;
use super::interpreter::SolutionInterpreter;
use super::seeder::{FeasibilitySeeder, SeedRejection};
use crate::domain::{AlloyTarget, Catalog, ChargeOutcome, LpBackend, RequestStage};
use crate::solver::{AdapterOutcome, SolverAdapter};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, Instrument};

/// Tunables of one optimizer instance
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Time budget per solver call, diagnostic re-solves included
    pub time_budget: Duration,
    /// Solver tolerance ε used for slack and invariant checks
    pub tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(10),
            tolerance: 1e-6,
        }
    }
}

/// Stateless pipeline from catalog + alloy target to a charge outcome
pub struct ChargeOptimizer {
    pub(crate) adapter: SolverAdapter,
    pub(crate) config: OptimizerConfig,
}

impl ChargeOptimizer {
    pub fn new(backend: Arc<dyn LpBackend>) -> Self {
        Self {
            adapter: SolverAdapter::new(backend),
            config: OptimizerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Solve one optimization request to its terminal state.
    ///
    /// `InvalidData` is the only error path; every other condition is a
    /// terminal `ChargeOutcome`. The primary solve never loosens a
    /// constraint; only the diagnostic pass does, and only for reporting.
    pub async fn optimize(
        &self,
        catalog: &Catalog,
        target: &AlloyTarget,
    ) -> Result<ChargeOutcome, InvalidData> {
        let span = info_span!("optimize", heat_weight = target.heat_weight);

        async move {
            let built = ProblemBuilder::build(catalog, target)?;
            info!(stage = %RequestStage::Built, rows = built.model.rows.len());

            let seed =
                match FeasibilitySeeder::seed(&built, target.heat_weight, self.config.tolerance) {
                    Ok(seed) => seed,
                    Err(SeedRejection::InsufficientStock {
                        available_kg,
                        required_kg,
                    }) => {
                        return Ok(ChargeOutcome::InsufficientStock {
                            available_kg,
                            required_kg,
                        })
                    }
                    Err(SeedRejection::OverconstrainedMinimums {
                        mandatory_kg,
                        heat_weight_kg,
                    }) => {
                        return Ok(ChargeOutcome::OverconstrainedMinimums {
                            mandatory_kg,
                            heat_weight_kg,
                        })
                    }
                };
            info!(stage = %RequestStage::Seeded, warnings = seed.warnings.len());

            let outcome = self
                .adapter
                .solve(
                    &built.model,
                    Some(seed.warm_start.clone()),
                    self.config.time_budget,
                )
                .await;
            info!(stage = %RequestStage::Solved, backend = %self.adapter.backend_name());

            let reported = match outcome {
                AdapterOutcome::Optimal {
                    values,
                    objective,
                    stats,
                } => {
                    info!(solve_ms = stats.solve_time.as_millis() as u64, objective);
                    ChargeOutcome::Optimal(SolutionInterpreter::interpret(
                        catalog,
                        target,
                        &built,
                        &values,
                        objective,
                        seed.warnings,
                        self.config.tolerance,
                    ))
                }
                AdapterOutcome::Infeasible => {
                    let diagnosis = diagnosis::localize(
                        &self.adapter,
                        catalog,
                        target,
                        &built,
                        self.config.time_budget,
                    )
                    .await;

                    let mut warnings = seed.warnings;
                    if let Some(report) = &diagnosis {
                        warnings.push(report.message.clone());
                    }
                    ChargeOutcome::Infeasible {
                        diagnosis,
                        warnings,
                    }
                }
                AdapterOutcome::Timeout => ChargeOutcome::Timeout {
                    budget_ms: self.config.time_budget.as_millis() as u64,
                },
                AdapterOutcome::SolverError { detail } => ChargeOutcome::SolverError { detail },
            };

            info!(stage = %RequestStage::Reported, optimal = reported.is_optimal());
            Ok(reported)
        }
        .instrument(span)
        .await
    }

    /// Evaluate several alloy targets against the same catalog
    /// concurrently. Inputs are read-only snapshots and every outcome is
    /// freshly allocated, so no locking is involved.
    pub async fn optimize_many(
        &self,
        catalog: &Catalog,
        targets: &[AlloyTarget],
    ) -> Vec<Result<ChargeOutcome, InvalidData>> {
        join_all(targets.iter().map(|target| self.optimize(catalog, target))).await
    }
}
