use crate::domain::{
    models::LpModel,
    solver_service::{LpBackend, Result, SolveOutcome, SolveStats, SolverError},
    value_objects::Relation,
};
use good_lp::{
    solvers::coin_cbc, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolution, SolverModel, Variable as GoodLpVariable,
};

/// COIN-OR CBC backend, available behind the `coin-cbc` feature for sites
/// with the native library installed.
pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LpBackend for CoinCbcSolver {
    // CBC's initial-solution hints apply to MIP starts only; the LP warm
    // start is accepted and ignored
    fn solve(&self, model: &LpModel, _warm_start: Option<&[f64]>) -> Result<SolveOutcome> {
        self.validate(model)?;

        if model.variables.iter().any(|b| b.is_pre_infeasible()) {
            return Ok(SolveOutcome::Infeasible);
        }

        let mut vars = variables!();
        let lp_variables: Vec<GoodLpVariable> = model
            .variables
            .iter()
            .map(|b| vars.add(variable().min(b.lower).max(b.upper)))
            .collect();

        let mut objective: Expression = 0.into();
        for (i, &coeff) in model.objective.iter().enumerate() {
            if coeff != 0.0 {
                objective += coeff * lp_variables[i];
            }
        }

        let mut lp_model = vars.minimise(objective).using(coin_cbc::coin_cbc);

        for row in &model.rows {
            if row.coefficients.iter().all(|&c| c == 0.0) {
                if row.is_violated(&vec![0.0; model.num_variables()], 0.0) {
                    return Ok(SolveOutcome::Infeasible);
                }
                continue;
            }

            let mut lhs: Expression = 0.into();
            for (i, &coeff) in row.coefficients.iter().enumerate() {
                if coeff != 0.0 {
                    lhs += coeff * lp_variables[i];
                }
            }

            lp_model = match row.relation {
                Relation::Le => lp_model.with(lhs.leq(row.rhs)),
                Relation::Eq => lp_model.with(lhs.eq(row.rhs)),
                Relation::Ge => lp_model.with(lhs.geq(row.rhs)),
            };
        }

        let started = std::time::Instant::now();
        match lp_model.solve() {
            Ok(sol) => {
                let values: Vec<f64> = lp_variables.iter().map(|&v| sol.value(v)).collect();
                let objective = model.objective_value(&values);
                Ok(SolveOutcome::Optimal {
                    values,
                    objective,
                    stats: SolveStats {
                        solve_time: started.elapsed(),
                    },
                })
            }
            Err(ResolutionError::Infeasible) => Ok(SolveOutcome::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(SolveOutcome::Unbounded),
            Err(e) => Err(SolverError::ExecutionFailed(format!("{e:?}"))),
        }
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }
}
