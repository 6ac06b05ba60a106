// Solution interpreter: derives the operator-facing charge report from a
// raw optimal assignment.

use super::builder::BuiltProblem;
use crate::domain::{AlloyTarget, Catalog, ChargeSolution, ElementWindow, MaterialUsage};

pub struct SolutionInterpreter;

impl SolutionInterpreter {
    pub fn interpret(
        catalog: &Catalog,
        target: &AlloyTarget,
        built: &BuiltProblem,
        values: &[f64],
        objective: f64,
        warnings: Vec<String>,
        tolerance: f64,
    ) -> ChargeSolution {
        let heat_weight = target.heat_weight;

        let materials = catalog
            .materials
            .iter()
            .zip(&built.model.variables)
            .zip(values)
            .map(|((material, bounds), &kg)| MaterialUsage {
                id: material.id.clone(),
                lower_kg: bounds.lower,
                upper_kg: bounds.upper,
                optimal_kg: kg,
                pct_of_charge: kg / heat_weight,
                cost: kg * material.cost_per_kg,
            })
            .collect();

        let chemistry = built
            .elements
            .iter()
            .map(|element| achieved_window(catalog, target, element, values, tolerance))
            .collect();

        // Rows satisfied with (near-)zero slack; equality rows always
        // qualify, which keeps the weight row visible in the report.
        let binding_constraints = built
            .model
            .rows
            .iter()
            .filter(|row| row.slack(values).abs() <= tolerance * (1.0 + row.rhs.abs()))
            .map(|row| row.tag.clone())
            .collect();

        ChargeSolution {
            total_cost: objective,
            cost_per_ton: objective / (heat_weight / 1000.0),
            materials,
            chemistry,
            binding_constraints,
            warnings,
        }
    }
}

fn achieved_window(
    catalog: &Catalog,
    target: &AlloyTarget,
    element: &str,
    values: &[f64],
    tolerance: f64,
) -> ElementWindow {
    let heat_weight = target.heat_weight;
    let (target_min, target_max) = target.target_range(element);

    let mut achieved_min = 0.0;
    let mut achieved_max = 0.0;
    for (material, &kg) in catalog.materials.iter().zip(values) {
        let (lo, hi) = material.chem_range(element);
        achieved_min += kg * lo;
        achieved_max += kg * hi;
    }
    achieved_min /= heat_weight;
    achieved_max /= heat_weight;

    ElementWindow {
        element: element.to_string(),
        target_min,
        target_max,
        achieved_min,
        achieved_max,
        in_spec: achieved_min >= target_min - tolerance && achieved_max <= target_max + tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builder::ProblemBuilder;
    use crate::domain::Material;
    use approx::assert_relative_eq;

    #[test]
    fn derives_costs_percentages_and_chemistry() {
        let catalog = Catalog::new(vec![
            Material::new("scrap_a", 0.30, 10_000.0).with_element("Fe", 0.95, 0.98),
            Material::new("billet", 0.50, 10_000.0)
                .with_type("acero")
                .with_element("Fe", 0.99, 1.0),
        ]);
        let target = AlloyTarget::new(1000.0).with_window("Fe", 0.96, 1.0);
        let built = ProblemBuilder::build(&catalog, &target).unwrap();

        // Optimum of this instance: 750 kg scrap, 250 kg billet
        let values = [750.0, 250.0];
        let objective = 0.30 * 750.0 + 0.50 * 250.0;
        let solution = SolutionInterpreter::interpret(
            &catalog, &target, &built, &values, objective, vec![], 1e-6,
        );

        assert_relative_eq!(solution.total_cost, 350.0, epsilon = 1e-9);
        assert_relative_eq!(solution.cost_per_ton, 350.0, epsilon = 1e-9);
        assert_relative_eq!(solution.materials[0].pct_of_charge, 0.75, epsilon = 1e-9);
        assert_relative_eq!(solution.materials[1].cost, 125.0, epsilon = 1e-9);

        let fe = &solution.chemistry[0];
        assert_relative_eq!(fe.achieved_min, 0.96, epsilon = 1e-9);
        assert_relative_eq!(fe.achieved_max, 0.985, epsilon = 1e-9);
        assert!(fe.in_spec);
    }

    #[test]
    fn binding_rows_are_reported() {
        let catalog = Catalog::new(vec![
            Material::new("scrap_a", 0.30, 10_000.0).with_element("Fe", 0.95, 0.98),
            Material::new("billet", 0.50, 10_000.0)
                .with_type("acero")
                .with_element("Fe", 0.99, 1.0),
        ]);
        let target = AlloyTarget::new(1000.0).with_window("Fe", 0.96, 1.0);
        let built = ProblemBuilder::build(&catalog, &target).unwrap();

        let values = [750.0, 250.0];
        let solution =
            SolutionInterpreter::interpret(&catalog, &target, &built, &values, 350.0, vec![], 1e-6);

        // Weight equality and the Fe lower row sit at zero slack; the Fe
        // upper row has 15 kg of slack.
        assert!(solution
            .binding_constraints
            .contains(&"total weight".to_string()));
        assert!(solution
            .binding_constraints
            .contains(&"Fe lower".to_string()));
        assert!(!solution
            .binding_constraints
            .contains(&"Fe upper".to_string()));
    }
}
