use crate::domain::{
    models::LpModel,
    solver_service::{LpBackend, Result, SolveOutcome, SolveStats, SolverError},
    value_objects::Relation,
};
use good_lp::{
    solvers::microlp, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolution, SolverModel, Variable as GoodLpVariable,
};

/// Pure-Rust simplex backend; the default because it needs no native
/// libraries.
pub struct MicrolpSolver;

impl MicrolpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicrolpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LpBackend for MicrolpSolver {
    // microlp has no warm-start interface; the hint is accepted and ignored
    fn solve(&self, model: &LpModel, _warm_start: Option<&[f64]>) -> Result<SolveOutcome> {
        self.validate(model)?;

        // An empty feasible interval makes the instance trivially
        // infeasible; decide here rather than hand inverted bounds to the
        // backend.
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

        let mut lp_model = vars.minimise(objective).using(microlp::microlp);

        for row in &model.rows {
            // Constant rows (all-zero coefficients) are decided directly
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
        "microlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConstraintFamily, ConstraintRow, VariableBounds};
    use approx::assert_relative_eq;

    fn two_var_model() -> LpModel {
        // min 0.3a + 0.5b  s.t.  a + b = 1000, 0 ≤ a ≤ 600, 0 ≤ b ≤ 1000
        LpModel {
            variables: vec![
                VariableBounds {
                    name: "a".into(),
                    lower: 0.0,
                    upper: 600.0,
                },
                VariableBounds {
                    name: "b".into(),
                    lower: 0.0,
                    upper: 1000.0,
                },
            ],
            rows: vec![ConstraintRow::new(
                vec![1.0, 1.0],
                Relation::Eq,
                1000.0,
                "total weight",
                ConstraintFamily::Weight,
            )],
            objective: vec![0.3, 0.5],
        }
    }

    #[test]
    fn solves_a_small_lp_to_optimality() {
        let outcome = MicrolpSolver::new().solve(&two_var_model(), None).unwrap();
        match outcome {
            SolveOutcome::Optimal {
                values, objective, ..
            } => {
                assert_relative_eq!(values[0], 600.0, epsilon = 1e-6);
                assert_relative_eq!(values[1], 400.0, epsilon = 1e-6);
                assert_relative_eq!(objective, 380.0, epsilon = 1e-6);
            }
            other => panic!("expected optimal, got {other:?}"),
        }
    }

    #[test]
    fn reports_infeasible_for_empty_bound_intervals() {
        let mut model = two_var_model();
        model.variables[0].lower = 700.0;
        model.variables[0].upper = 600.0;

        let outcome = MicrolpSolver::new().solve(&model, None).unwrap();
        assert!(matches!(outcome, SolveOutcome::Infeasible));
    }

    #[test]
    fn decides_violated_constant_rows_without_solving() {
        let mut model = two_var_model();
        model.rows.push(ConstraintRow::new(
            vec![0.0, 0.0],
            Relation::Ge,
            50.0,
            "acero minimum",
            ConstraintFamily::Category,
        ));

        let outcome = MicrolpSolver::new().solve(&model, None).unwrap();
        assert!(matches!(outcome, SolveOutcome::Infeasible));
    }

    #[test]
    fn rejects_mismatched_row_widths() {
        let mut model = two_var_model();
        model.rows.push(ConstraintRow::new(
            vec![1.0],
            Relation::Le,
            1.0,
            "bad row",
            ConstraintFamily::Chemistry,
        ));

        let err = MicrolpSolver::new().solve(&model, None).unwrap_err();
        assert!(matches!(err, SolverError::InvalidModel(_)));
    }
}
