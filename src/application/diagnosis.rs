// Infeasibility diagnosis: relax one constraint family at a time on an
// independent model copy and re-solve, localizing the conflict for the
// operator instead of reporting a bare "infeasible". Diagnostic only; the
// primary solve never runs against a loosened model.

use super::builder::BuiltProblem;
use crate::domain::{
    AlloyTarget, Catalog, ConstraintFamily, LpModel, Relation, RelaxStep, RelaxationReport,
};
use crate::solver::{AdapterOutcome, SolverAdapter};
use std::time::Duration;
use tracing::debug;

/// Fixed priority order of the relaxation pass
pub const FAMILY_PRIORITY: [ConstraintFamily; 3] = [
    ConstraintFamily::Percentage,
    ConstraintFamily::Category,
    ConstraintFamily::Chemistry,
];

/// Loosening schedule tried per family, smallest first
pub const RELAX_SCHEDULE: [RelaxStep; 5] = [
    RelaxStep::Loosen(0.05),
    RelaxStep::Loosen(0.10),
    RelaxStep::Loosen(0.25),
    RelaxStep::Loosen(0.50),
    RelaxStep::Drop,
];

/// Find the single family whose relaxation restores feasibility, if any.
/// Returns `None` when no family alone explains the conflict or when the
/// diagnostic solves themselves misbehave.
pub async fn localize(
    adapter: &SolverAdapter,
    catalog: &Catalog,
    target: &AlloyTarget,
    built: &BuiltProblem,
    budget: Duration,
) -> Option<RelaxationReport> {
    for family in FAMILY_PRIORITY {
        for step in RELAX_SCHEDULE {
            let relaxed = relax_model(&built.model, catalog, target, family, step);
            debug!(%family, %step, "diagnostic re-solve");

            match adapter.solve(&relaxed, None, budget).await {
                AdapterOutcome::Optimal { .. } => {
                    let message = match step {
                        RelaxStep::Loosen(frac) => format!(
                            "infeasible; relaxing {} by {:.0}% would restore feasibility",
                            family,
                            frac * 100.0
                        ),
                        RelaxStep::Drop => format!(
                            "infeasible; only removing {} entirely restores feasibility",
                            family
                        ),
                    };
                    return Some(RelaxationReport {
                        family,
                        step,
                        message,
                    });
                }
                AdapterOutcome::Infeasible => continue,
                // Timeout or malfunction mid-diagnosis: stop probing
                _ => return None,
            }
        }
    }
    None
}

/// Independent copy of the model with one family loosened. The weight
/// equality and stock caps are never relaxed.
pub fn relax_model(
    model: &LpModel,
    catalog: &Catalog,
    target: &AlloyTarget,
    family: ConstraintFamily,
    step: RelaxStep,
) -> LpModel {
    let mut relaxed = model.clone();

    match family {
        ConstraintFamily::Percentage => {
            let heat_weight = target.heat_weight;
            for (bounds, material) in relaxed.variables.iter_mut().zip(&catalog.materials) {
                match step {
                    RelaxStep::Loosen(frac) => {
                        bounds.lower = material.min_pct * (1.0 - frac) * heat_weight;
                        bounds.upper = material
                            .max_stock
                            .min(material.max_pct * (1.0 + frac) * heat_weight);
                    }
                    RelaxStep::Drop => {
                        bounds.lower = 0.0;
                        bounds.upper = material.max_stock;
                    }
                }
            }
        }
        ConstraintFamily::Category | ConstraintFamily::Chemistry => match step {
            RelaxStep::Loosen(frac) => {
                for row in relaxed.rows.iter_mut().filter(|r| r.family == family) {
                    match row.relation {
                        Relation::Ge => row.rhs *= 1.0 - frac,
                        Relation::Le => row.rhs *= 1.0 + frac,
                        Relation::Eq => {}
                    }
                }
            }
            RelaxStep::Drop => relaxed.rows.retain(|r| r.family != family),
        },
        ConstraintFamily::Weight => {}
    }

    relaxed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builder::ProblemBuilder;
    use crate::domain::Material;
    use approx::assert_relative_eq;

    fn fixture() -> (Catalog, AlloyTarget, BuiltProblem) {
        let catalog = Catalog::new(vec![
            Material::new("dirty", 0.2, 10_000.0)
                .with_pct_window(0.5, 1.0)
                .with_element("Fe", 0.5, 0.6),
            Material::new("clean", 0.6, 10_000.0)
                .with_type("acero")
                .with_element("Fe", 0.99, 1.0),
        ]);
        let target = AlloyTarget::new(1000.0)
            .with_window("Fe", 0.9, 1.0)
            .with_min_acero_pct(0.2)
            .with_max_returns_pct(0.5);
        let built = ProblemBuilder::build(&catalog, &target).unwrap();
        (catalog, target, built)
    }

    #[test]
    fn percentage_relaxation_reopens_variable_bounds() {
        let (catalog, target, built) = fixture();
        let relaxed = relax_model(
            &built.model,
            &catalog,
            &target,
            ConstraintFamily::Percentage,
            RelaxStep::Loosen(0.5),
        );

        assert_relative_eq!(relaxed.variables[0].lower, 250.0, epsilon = 1e-9);
        // max_pct loosened by half raises the cap to 1.5x heat weight
        assert_relative_eq!(relaxed.variables[0].upper, 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn chemistry_relaxation_moves_row_bounds_apart() {
        let (catalog, target, built) = fixture();
        let relaxed = relax_model(
            &built.model,
            &catalog,
            &target,
            ConstraintFamily::Chemistry,
            RelaxStep::Loosen(0.1),
        );

        let lower = relaxed.rows.iter().find(|r| r.tag == "Fe lower").unwrap();
        let upper = relaxed.rows.iter().find(|r| r.tag == "Fe upper").unwrap();
        assert_relative_eq!(lower.rhs, 810.0, epsilon = 1e-9);
        assert_relative_eq!(upper.rhs, 1100.0, epsilon = 1e-9);
    }

    #[test]
    fn drop_removes_exactly_one_family() {
        let (catalog, target, built) = fixture();
        let relaxed = relax_model(
            &built.model,
            &catalog,
            &target,
            ConstraintFamily::Category,
            RelaxStep::Drop,
        );

        assert!(relaxed
            .rows
            .iter()
            .all(|r| r.family != ConstraintFamily::Category));
        assert_eq!(relaxed.rows.len(), built.model.rows.len() - 2);
    }

    #[test]
    fn untouched_families_keep_their_rows() {
        let (catalog, target, built) = fixture();
        let relaxed = relax_model(
            &built.model,
            &catalog,
            &target,
            ConstraintFamily::Chemistry,
            RelaxStep::Loosen(0.25),
        );

        let weight = relaxed.rows.iter().find(|r| r.tag == "total weight").unwrap();
        assert_eq!(weight.rhs, 1000.0);
        let acero = relaxed.rows.iter().find(|r| r.tag == "acero minimum").unwrap();
        assert_eq!(acero.rhs, 200.0);
    }
}
