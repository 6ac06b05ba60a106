// Problem builder: semantic validation of the catalog plus assembly of the
// normalized LP description. Schema validation already happened in the
// external loader; only self-consistency is checked here.

use super::constraints;
use crate::domain::{AlloyTarget, Catalog, LpModel, Material};

/// Malformed or self-contradictory catalog data, detected before any solve
#[derive(Debug, thiserror::Error)]
pub enum InvalidData {
    #[error("catalog contains no materials")]
    EmptyCatalog,

    #[error("material with blank id")]
    BlankMaterialId,

    #[error("duplicate material id '{id}'")]
    DuplicateMaterialId { id: String },

    #[error("material '{material}': cost_per_kg must be positive, got {cost}")]
    NonPositiveCost { material: String, cost: f64 },

    #[error("material '{material}': max_stock must be non-negative, got {stock}")]
    NegativeStock { material: String, stock: f64 },

    #[error("material '{material}': blank category tag")]
    BlankCategory { material: String },

    #[error(
        "material '{material}': percentage window [{min_pct}, {max_pct}] must lie within [0, 1]"
    )]
    PercentOutOfRange {
        material: String,
        min_pct: f64,
        max_pct: f64,
    },

    #[error("material '{material}': min_pct {min_pct} exceeds max_pct {max_pct}")]
    PercentBoundsInverted {
        material: String,
        min_pct: f64,
        max_pct: f64,
    },

    #[error("material '{material}', element '{element}': chem_min {min} exceeds chem_max {max}")]
    ChemistryRangeInverted {
        material: String,
        element: String,
        min: f64,
        max: f64,
    },

    #[error("{owner}: malformed element symbol '{symbol}'")]
    MalformedElementSymbol { owner: String, symbol: String },

    #[error("heat_weight must be positive, got {heat_weight}")]
    NonPositiveHeatWeight { heat_weight: f64 },

    #[error("bath weight must be positive, got {weight_kg}")]
    NonPositiveBathWeight { weight_kg: f64 },

    #[error("alloy target, element '{element}': window [{min}, {max}] is inverted")]
    TargetWindowInverted { element: String, min: f64, max: f64 },

    #[error("alloy target: {field} must lie within [0, 1], got {value}")]
    TargetFractionOutOfRange { field: &'static str, value: f64 },

    #[error("element '{element}' is required by the alloy target but absent from every material")]
    UnreachableElement { element: String },
}

/// Normalized LP plus the metadata later stages need
#[derive(Debug, Clone)]
pub struct BuiltProblem {
    pub model: LpModel,
    pub elements: Vec<String>,
    /// Ids of materials whose bounds came out empty (`lower > upper`);
    /// emitted anyway, kept for faster infeasibility diagnosis
    pub pre_infeasible: Vec<String>,
}

pub struct ProblemBuilder;

impl ProblemBuilder {
    /// Build the normalized LP: per-material bounds, one weight equality,
    /// one (≥, ≤) pair per element, one acero ≥ row, one returns ≤ row,
    /// and the cost objective.
    pub fn build(catalog: &Catalog, target: &AlloyTarget) -> Result<BuiltProblem, InvalidData> {
        validate(catalog, target)?;

        let materials = &catalog.materials;
        let elements = constraints::element_set(materials, target);

        let variables: Vec<_> = materials
            .iter()
            .map(|m| constraints::variable_bounds(m, target.heat_weight))
            .collect();

        let pre_infeasible: Vec<String> = variables
            .iter()
            .filter(|b| b.is_pre_infeasible())
            .map(|b| b.name.clone())
            .collect();

        let mut rows = Vec::with_capacity(2 * elements.len() + 3);
        rows.push(constraints::weight_row(materials.len(), target.heat_weight));
        rows.extend(constraints::chemistry_rows(materials, target, &elements));
        rows.extend(constraints::category_rows(materials, target));

        let objective = materials.iter().map(|m| m.cost_per_kg).collect();

        Ok(BuiltProblem {
            model: LpModel {
                variables,
                rows,
                objective,
            },
            elements,
            pre_infeasible,
        })
    }
}

fn validate(catalog: &Catalog, target: &AlloyTarget) -> Result<(), InvalidData> {
    if catalog.is_empty() {
        return Err(InvalidData::EmptyCatalog);
    }
    if target.heat_weight <= 0.0 {
        return Err(InvalidData::NonPositiveHeatWeight {
            heat_weight: target.heat_weight,
        });
    }
    for (field, value) in [
        ("min_acero_pct", target.min_acero_pct),
        ("max_returns_pct", target.max_returns_pct),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(InvalidData::TargetFractionOutOfRange { field, value });
        }
    }

    let mut seen = std::collections::BTreeSet::new();
    for material in &catalog.materials {
        validate_material(material)?;
        if !seen.insert(material.id.as_str()) {
            return Err(InvalidData::DuplicateMaterialId {
                id: material.id.clone(),
            });
        }
    }

    validate_target_chemistry(catalog, target)?;
    Ok(())
}

pub(crate) fn validate_material(material: &Material) -> Result<(), InvalidData> {
    if material.id.trim().is_empty() {
        return Err(InvalidData::BlankMaterialId);
    }
    if material.cost_per_kg <= 0.0 {
        return Err(InvalidData::NonPositiveCost {
            material: material.id.clone(),
            cost: material.cost_per_kg,
        });
    }
    if material.max_stock < 0.0 {
        return Err(InvalidData::NegativeStock {
            material: material.id.clone(),
            stock: material.max_stock,
        });
    }
    if material.material_type.trim().is_empty() {
        return Err(InvalidData::BlankCategory {
            material: material.id.clone(),
        });
    }
    if !(0.0..=1.0).contains(&material.min_pct) || !(0.0..=1.0).contains(&material.max_pct) {
        return Err(InvalidData::PercentOutOfRange {
            material: material.id.clone(),
            min_pct: material.min_pct,
            max_pct: material.max_pct,
        });
    }
    if material.min_pct > material.max_pct {
        return Err(InvalidData::PercentBoundsInverted {
            material: material.id.clone(),
            min_pct: material.min_pct,
            max_pct: material.max_pct,
        });
    }

    for symbol in material.chem_min.keys().chain(material.chem_max.keys()) {
        check_element_symbol(symbol, &material.id)?;
    }
    for (element, &min) in &material.chem_min {
        let max = material.chem_max.get(element).copied().unwrap_or(min);
        if min > max {
            return Err(InvalidData::ChemistryRangeInverted {
                material: material.id.clone(),
                element: element.clone(),
                min,
                max,
            });
        }
    }
    Ok(())
}

fn validate_target_chemistry(catalog: &Catalog, target: &AlloyTarget) -> Result<(), InvalidData> {
    for symbol in target
        .chem_target_min
        .keys()
        .chain(target.chem_target_max.keys())
    {
        check_element_symbol(symbol, "alloy target")?;

        // An element the target names but no material carries is
        // structurally unreachable, not a trivially-satisfied row.
        let known = catalog.materials.iter().any(|m| {
            m.chem_min.contains_key(symbol.as_str()) || m.chem_max.contains_key(symbol.as_str())
        });
        if !known {
            return Err(InvalidData::UnreachableElement {
                element: symbol.clone(),
            });
        }
    }

    for (element, &min) in &target.chem_target_min {
        if let Some(&max) = target.chem_target_max.get(element) {
            if min > max {
                return Err(InvalidData::TargetWindowInverted {
                    element: element.clone(),
                    min,
                    max,
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn check_element_symbol(symbol: &str, owner: &str) -> Result<(), InvalidData> {
    let mut chars = symbol.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(InvalidData::MalformedElementSymbol {
            owner: owner.to_string(),
            symbol: symbol.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Material::new("scrap_a", 0.30, 10_000.0).with_element("Fe", 0.95, 0.98),
            Material::new("billet", 0.50, 10_000.0)
                .with_type("acero")
                .with_element("Fe", 0.99, 1.0),
        ])
    }

    fn target() -> AlloyTarget {
        AlloyTarget::new(1000.0).with_window("Fe", 0.96, 1.0)
    }

    #[test]
    fn emits_expected_row_inventory() {
        let built = ProblemBuilder::build(&catalog(), &target()).unwrap();

        // 1 weight + 2 per element + acero min + returns max
        assert_eq!(built.elements, vec!["Fe"]);
        assert_eq!(built.model.rows.len(), 1 + 2 + 2);
        assert_eq!(built.model.objective, vec![0.30, 0.50]);
        assert!(built.pre_infeasible.is_empty());
    }

    #[test]
    fn inverted_percentage_window_is_invalid() {
        let mut cat = catalog();
        cat.materials[0].min_pct = 0.6;
        cat.materials[0].max_pct = 0.4;

        let err = ProblemBuilder::build(&cat, &target()).unwrap_err();
        assert!(matches!(err, InvalidData::PercentBoundsInverted { .. }));
    }

    #[test]
    fn inverted_chemistry_range_is_invalid() {
        let mut cat = catalog();
        cat.materials[0] = Material::new("scrap_a", 0.30, 10_000.0).with_element("Fe", 0.99, 0.95);

        let err = ProblemBuilder::build(&cat, &target()).unwrap_err();
        assert!(matches!(err, InvalidData::ChemistryRangeInverted { .. }));
    }

    #[test]
    fn non_positive_heat_weight_is_invalid() {
        let err = ProblemBuilder::build(&catalog(), &AlloyTarget::new(0.0)).unwrap_err();
        assert!(matches!(err, InvalidData::NonPositiveHeatWeight { .. }));
    }

    #[test]
    fn target_element_absent_from_every_material_is_unreachable() {
        let bad_target = target().with_window("Mo", 0.01, 0.02);
        let err = ProblemBuilder::build(&catalog(), &bad_target).unwrap_err();
        assert!(matches!(err, InvalidData::UnreachableElement { element } if element == "Mo"));
    }

    #[test]
    fn malformed_element_symbol_is_invalid() {
        let mut cat = catalog();
        cat.materials[0] = Material::new("scrap_a", 0.30, 10_000.0).with_element("F e", 0.1, 0.2);

        let err = ProblemBuilder::build(&cat, &target()).unwrap_err();
        assert!(matches!(err, InvalidData::MalformedElementSymbol { .. }));
    }

    #[test]
    fn empty_bound_interval_is_emitted_and_flagged() {
        let mut cat = catalog();
        // Minimum percentage demands more than the available stock
        cat.materials[0].max_stock = 100.0;
        cat.materials[0].min_pct = 0.5;

        let built = ProblemBuilder::build(&cat, &target()).unwrap();
        assert_eq!(built.pre_infeasible, vec!["scrap_a".to_string()]);
        assert_eq!(built.model.variables[0].lower, 500.0);
        assert_eq!(built.model.variables[0].upper, 100.0);
    }

    #[test]
    fn duplicate_ids_are_invalid() {
        let cat = Catalog::new(vec![
            Material::new("scrap_a", 0.30, 1000.0).with_element("Fe", 0.9, 1.0),
            Material::new("scrap_a", 0.20, 1000.0).with_element("Fe", 0.9, 1.0),
        ]);
        let err = ProblemBuilder::build(&cat, &target()).unwrap_err();
        assert!(matches!(err, InvalidData::DuplicateMaterialId { .. }));
    }
}
