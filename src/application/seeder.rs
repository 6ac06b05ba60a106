// Feasibility seeder: cheap necessary-condition checks plus a heuristic
// warm-start composition, both computed before any solver call.

use super::builder::BuiltProblem;
use crate::domain::Relation;
use tracing::debug;

/// Necessary-condition failure; the solver is never invoked for these
#[derive(Debug, Clone, PartialEq)]
pub enum SeedRejection {
    /// Combined upper bounds cannot reach the heat weight
    InsufficientStock { available_kg: f64, required_kg: f64 },
    /// Mandatory minimums alone exceed the heat weight
    OverconstrainedMinimums { mandatory_kg: f64, heat_weight_kg: f64 },
}

/// Warm-start point and the warnings its evaluation seeded
#[derive(Debug, Clone)]
pub struct Seed {
    /// Nominal composition summing to the heat weight; not necessarily
    /// feasible for chemistry or category constraints
    pub warm_start: Vec<f64>,
    pub warnings: Vec<String>,
}

pub struct FeasibilitySeeder;

impl FeasibilitySeeder {
    pub fn seed(
        built: &BuiltProblem,
        heat_weight: f64,
        tolerance: f64,
    ) -> Result<Seed, SeedRejection> {
        let bounds = &built.model.variables;

        let available_kg: f64 = bounds.iter().map(|b| b.upper.max(0.0)).sum();
        if available_kg + tolerance < heat_weight {
            return Err(SeedRejection::InsufficientStock {
                available_kg,
                required_kg: heat_weight,
            });
        }

        let mandatory_kg: f64 = bounds.iter().map(|b| b.lower).sum();
        if mandatory_kg > heat_weight + tolerance {
            return Err(SeedRejection::OverconstrainedMinimums {
                mandatory_kg,
                heat_weight_kg: heat_weight,
            });
        }

        let warm_start = nominal_composition(built, heat_weight);
        let warnings = evaluate_warm_start(built, &warm_start, tolerance);
        debug!(
            violations = warnings.len(),
            "warm start evaluated against assembled rows"
        );

        Ok(Seed {
            warm_start,
            warnings,
        })
    }
}

/// Distribute the heat weight proportionally across materials, weighted by
/// the midpoint of each material's feasible interval. Falls back to the
/// upper bounds when every midpoint is zero.
fn nominal_composition(built: &BuiltProblem, heat_weight: f64) -> Vec<f64> {
    let bounds = &built.model.variables;

    let mut weights: Vec<f64> = bounds
        .iter()
        .map(|b| ((b.lower + b.upper) / 2.0).max(0.0))
        .collect();
    if weights.iter().sum::<f64>() <= 0.0 {
        weights = bounds.iter().map(|b| b.upper.max(0.0)).collect();
    }

    // total > 0 is guaranteed: the stock-sufficiency check already passed
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| w * heat_weight / total).collect()
}

/// Direct evaluation of the nominal mix against every row and bound: which
/// constraints does a "reasonable" naive composition already violate?
fn evaluate_warm_start(built: &BuiltProblem, warm_start: &[f64], tolerance: f64) -> Vec<String> {
    let mut warnings = Vec::new();

    for id in &built.pre_infeasible {
        warnings.push(format!(
            "material '{id}': mandatory minimum exceeds its stock/percentage cap"
        ));
    }

    for (bound, &x) in built.model.variables.iter().zip(warm_start) {
        if x < bound.lower - tolerance || x > bound.upper + tolerance {
            warnings.push(format!(
                "nominal mix puts {:.1} kg of '{}' outside its [{:.1}, {:.1}] kg window",
                x, bound.name, bound.lower, bound.upper
            ));
        }
    }

    for row in &built.model.rows {
        if row.is_violated(warm_start, tolerance) {
            let lhs = row.lhs(warm_start);
            let detail = match row.relation {
                Relation::Ge => format!("{lhs:.3} below the required {:.3}", row.rhs),
                Relation::Le => format!("{lhs:.3} above the limit {:.3}", row.rhs),
                Relation::Eq => format!("{lhs:.3} differs from the required {:.3}", row.rhs),
            };
            warnings.push(format!("nominal mix violates {}: {detail}", row.tag));
        }
    }

    warnings
}
