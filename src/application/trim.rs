// Trim-addition planner: the heat is already molten and analyzed; find the
// least-cost additions that bring the blended chemistry into the final
// window. The mixing ratio constraint is linearized by multiplying through
// with the final weight:
//   Σ x_i·(chem_min_i,e − t_min,e) ≥ (t_min,e − bath_e)·W_bath
// and symmetrically for the upper side.

use super::builder::{check_element_symbol, validate_material, InvalidData};
use crate::domain::{
    BathState, Catalog, ConstraintFamily, ConstraintRow, ElementWindow, LpModel, Relation,
    TrimAddition, TrimOutcome, TrimPlan, TrimSpec, VariableBounds,
};
use crate::solver::AdapterOutcome;
use std::collections::BTreeSet;
use tracing::info;

use super::service::ChargeOptimizer;

impl ChargeOptimizer {
    /// Plan the least-cost addition mix for a bath against a final
    /// chemistry window. Additions are bounded by stock only; percentage
    /// and category limits do not apply after melt-down.
    pub async fn plan_trim(
        &self,
        catalog: &Catalog,
        bath: &BathState,
        spec: &TrimSpec,
    ) -> Result<TrimOutcome, InvalidData> {
        let model = build_trim_model(catalog, bath, spec)?;
        info!(rows = model.rows.len(), "trim model assembled");

        let outcome = self
            .adapter
            .solve(&model, None, self.config.time_budget)
            .await;

        Ok(match outcome {
            AdapterOutcome::Optimal {
                values, objective, ..
            } => TrimOutcome::Optimal(interpret_trim(
                catalog,
                bath,
                spec,
                &values,
                objective,
                self.config.tolerance,
            )),
            // The model carries only chemistry rows; there is no other
            // family to relax, so infeasibility is reported directly
            AdapterOutcome::Infeasible => TrimOutcome::Infeasible,
            AdapterOutcome::Timeout => TrimOutcome::Timeout {
                budget_ms: self.config.time_budget.as_millis() as u64,
            },
            AdapterOutcome::SolverError { detail } => TrimOutcome::SolverError { detail },
        })
    }
}

fn trim_elements(spec: &TrimSpec) -> Vec<String> {
    let mut set = BTreeSet::new();
    set.extend(spec.chem_min.keys().cloned());
    set.extend(spec.chem_max.keys().cloned());
    set.into_iter().collect()
}

fn build_trim_model(
    catalog: &Catalog,
    bath: &BathState,
    spec: &TrimSpec,
) -> Result<LpModel, InvalidData> {
    if catalog.is_empty() {
        return Err(InvalidData::EmptyCatalog);
    }
    if bath.weight_kg <= 0.0 {
        return Err(InvalidData::NonPositiveBathWeight {
            weight_kg: bath.weight_kg,
        });
    }
    for material in &catalog.materials {
        validate_material(material)?;
    }
    for symbol in bath.chemistry.keys() {
        check_element_symbol(symbol, "bath")?;
    }
    for symbol in spec.chem_min.keys().chain(spec.chem_max.keys()) {
        check_element_symbol(symbol, "trim spec")?;
    }
    for (element, &min) in &spec.chem_min {
        if let Some(&max) = spec.chem_max.get(element) {
            if min > max {
                return Err(InvalidData::TargetWindowInverted {
                    element: element.clone(),
                    min,
                    max,
                });
            }
        }
    }

    let materials = &catalog.materials;
    let variables = materials
        .iter()
        .map(|m| VariableBounds {
            name: m.id.clone(),
            lower: 0.0,
            upper: m.max_stock,
        })
        .collect();

    let mut rows = Vec::new();
    for element in trim_elements(spec) {
        let bath_frac = bath.chemistry.get(&element).copied().unwrap_or(0.0);
        let t_min = spec.chem_min.get(&element).copied().unwrap_or(0.0);
        let t_max = spec.chem_max.get(&element).copied().unwrap_or(1.0);

        let min_coeffs: Vec<f64> = materials
            .iter()
            .map(|m| m.chem_range(&element).0 - t_min)
            .collect();
        let max_coeffs: Vec<f64> = materials
            .iter()
            .map(|m| m.chem_range(&element).1 - t_max)
            .collect();

        rows.push(ConstraintRow::new(
            min_coeffs,
            Relation::Ge,
            (t_min - bath_frac) * bath.weight_kg,
            format!("{element} lower (blend)"),
            ConstraintFamily::Chemistry,
        ));
        rows.push(ConstraintRow::new(
            max_coeffs,
            Relation::Le,
            (t_max - bath_frac) * bath.weight_kg,
            format!("{element} upper (blend)"),
            ConstraintFamily::Chemistry,
        ));
    }

    Ok(LpModel {
        variables,
        rows,
        objective: materials.iter().map(|m| m.cost_per_kg).collect(),
    })
}

fn interpret_trim(
    catalog: &Catalog,
    bath: &BathState,
    spec: &TrimSpec,
    values: &[f64],
    objective: f64,
    tolerance: f64,
) -> TrimPlan {
    let total_addition_kg: f64 = values.iter().sum();
    let final_weight_kg = bath.weight_kg + total_addition_kg;

    let additions = catalog
        .materials
        .iter()
        .zip(values)
        .map(|(material, &kg)| TrimAddition {
            id: material.id.clone(),
            kg,
            cost: kg * material.cost_per_kg,
        })
        .collect();

    let chemistry = trim_elements(spec)
        .into_iter()
        .map(|element| {
            let bath_frac = bath.chemistry.get(&element).copied().unwrap_or(0.0);
            let t_min = spec.chem_min.get(&element).copied().unwrap_or(0.0);
            let t_max = spec.chem_max.get(&element).copied().unwrap_or(1.0);

            let mut blended_min = bath_frac * bath.weight_kg;
            let mut blended_max = blended_min;
            for (material, &kg) in catalog.materials.iter().zip(values) {
                let (lo, hi) = material.chem_range(&element);
                blended_min += kg * lo;
                blended_max += kg * hi;
            }
            blended_min /= final_weight_kg;
            blended_max /= final_weight_kg;

            ElementWindow {
                element,
                target_min: t_min,
                target_max: t_max,
                achieved_min: blended_min,
                achieved_max: blended_max,
                in_spec: blended_min >= t_min - tolerance && blended_max <= t_max + tolerance,
            }
        })
        .collect();

    TrimPlan {
        additions,
        total_addition_kg,
        total_cost: objective,
        final_weight_kg,
        chemistry,
    }
}
