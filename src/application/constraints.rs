// Constraint engine: the exact arithmetic of every constraint family.
// Pure functions over catalog data; the problem builder assembles their
// output into the normalized LP.

use crate::domain::{
    AlloyTarget, ConstraintFamily, ConstraintRow, Material, Relation, VariableBounds,
};
use std::collections::BTreeSet;

pub const ACERO_TYPE: &str = "acero";
pub const RETURNS_TYPE: &str = "returns";

/// Union of element symbols across all material chemistry tables and the
/// alloy target, in deterministic order
pub fn element_set(materials: &[Material], target: &AlloyTarget) -> Vec<String> {
    let mut set = BTreeSet::new();
    for material in materials {
        set.extend(material.chem_min.keys().cloned());
        set.extend(material.chem_max.keys().cloned());
    }
    set.extend(target.chem_target_min.keys().cloned());
    set.extend(target.chem_target_max.keys().cloned());
    set.into_iter().collect()
}

/// Percentage bounds are computed against the target heat weight, not the
/// (yet unknown) achieved total, so they stay linear. Stock caps the upper
/// side.
pub fn variable_bounds(material: &Material, heat_weight: f64) -> VariableBounds {
    VariableBounds {
        name: material.id.clone(),
        lower: material.min_pct * heat_weight,
        upper: material.max_stock.min(material.max_pct * heat_weight),
    }
}

/// The single total-weight equality row
pub fn weight_row(num_materials: usize, heat_weight: f64) -> ConstraintRow {
    ConstraintRow::new(
        vec![1.0; num_materials],
        Relation::Eq,
        heat_weight,
        "total weight",
        ConstraintFamily::Weight,
    )
}

/// One (≥, ≤) row pair per element: the worst-case minimum-content mix must
/// clear the lower target and the worst-case maximum-content mix must not
/// exceed the upper target.
pub fn chemistry_rows(
    materials: &[Material],
    target: &AlloyTarget,
    elements: &[String],
) -> Vec<ConstraintRow> {
    let mut rows = Vec::with_capacity(elements.len() * 2);
    for element in elements {
        let (target_min, target_max) = target.target_range(element);
        let min_coeffs: Vec<f64> = materials.iter().map(|m| m.chem_range(element).0).collect();
        let max_coeffs: Vec<f64> = materials.iter().map(|m| m.chem_range(element).1).collect();

        rows.push(ConstraintRow::new(
            min_coeffs,
            Relation::Ge,
            target_min * target.heat_weight,
            format!("{element} lower"),
            ConstraintFamily::Chemistry,
        ));
        rows.push(ConstraintRow::new(
            max_coeffs,
            Relation::Le,
            target_max * target.heat_weight,
            format!("{element} upper"),
            ConstraintFamily::Chemistry,
        ));
    }
    rows
}

/// Category aggregate rows: acero minimum and returns maximum. Materials
/// with any other type tag are simply excluded from both.
pub fn category_rows(materials: &[Material], target: &AlloyTarget) -> Vec<ConstraintRow> {
    let membership = |tag: &str| -> Vec<f64> {
        materials
            .iter()
            .map(|m| {
                if m.material_type.eq_ignore_ascii_case(tag) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    };

    vec![
        ConstraintRow::new(
            membership(ACERO_TYPE),
            Relation::Ge,
            target.min_acero_pct * target.heat_weight,
            "acero minimum",
            ConstraintFamily::Category,
        ),
        ConstraintRow::new(
            membership(RETURNS_TYPE),
            Relation::Le,
            target.max_returns_pct * target.heat_weight,
            "returns maximum",
            ConstraintFamily::Category,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> AlloyTarget {
        AlloyTarget::new(1000.0)
            .with_window("Fe", 0.9, 1.0)
            .with_min_acero_pct(0.4)
            .with_max_returns_pct(0.3)
    }

    #[test]
    fn element_set_is_union_of_materials_and_target() {
        let materials = vec![
            Material::new("m1", 0.3, 5000.0).with_element("Fe", 0.9, 0.95),
            Material::new("m2", 0.5, 5000.0).with_element("C", 0.01, 0.02),
        ];
        let target = AlloyTarget::new(1000.0).with_window("Mn", 0.005, 0.01);

        let elements = element_set(&materials, &target);
        assert_eq!(elements, vec!["C", "Fe", "Mn"]);
    }

    #[test]
    fn missing_element_contributes_zero_on_both_sides() {
        let materials = vec![
            Material::new("m1", 0.3, 5000.0).with_element("Fe", 0.9, 0.95),
            Material::new("m2", 0.5, 5000.0),
        ];
        let rows = chemistry_rows(&materials, &target(), &["Fe".to_string()]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].coefficients, vec![0.9, 0.0]);
        assert_eq!(rows[1].coefficients, vec![0.95, 0.0]);
    }

    #[test]
    fn chemistry_rows_scale_targets_by_heat_weight() {
        let materials = vec![Material::new("m1", 0.3, 5000.0).with_element("Fe", 0.9, 0.95)];
        let rows = chemistry_rows(&materials, &target(), &["Fe".to_string()]);

        assert_eq!(rows[0].relation, Relation::Ge);
        assert_eq!(rows[0].rhs, 900.0);
        assert_eq!(rows[1].relation, Relation::Le);
        assert_eq!(rows[1].rhs, 1000.0);
    }

    #[test]
    fn stock_caps_the_percentage_upper_bound() {
        let material = Material::new("m1", 0.3, 400.0).with_pct_window(0.1, 0.8);
        let bounds = variable_bounds(&material, 1000.0);

        assert_eq!(bounds.lower, 100.0);
        assert_eq!(bounds.upper, 400.0);
        assert!(!bounds.is_pre_infeasible());
    }

    #[test]
    fn unknown_category_tags_are_excluded_without_error() {
        let materials = vec![
            Material::new("m1", 0.3, 5000.0).with_type("acero"),
            Material::new("m2", 0.5, 5000.0).with_type("ferroalloy"),
            Material::new("m3", 0.2, 5000.0).with_type("returns"),
        ];
        let rows = category_rows(&materials, &target());

        assert_eq!(rows[0].coefficients, vec![1.0, 0.0, 0.0]);
        assert_eq!(rows[0].rhs, 400.0);
        assert_eq!(rows[1].coefficients, vec![0.0, 0.0, 1.0]);
        assert_eq!(rows[1].rhs, 300.0);
    }

    #[test]
    fn slack_sign_matches_relation() {
        let row = ConstraintRow::new(
            vec![1.0, 1.0],
            Relation::Ge,
            100.0,
            "test",
            ConstraintFamily::Category,
        );
        assert!(row.is_violated(&[40.0, 40.0], 1e-6));
        assert!(!row.is_violated(&[60.0, 60.0], 1e-6));
    }
}
