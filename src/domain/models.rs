use super::value_objects::{ConstraintFamily, Relation, RelaxStep};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Element symbol → mass fraction. BTreeMap keeps element ordering
/// deterministic across runs and reports.
pub type Chemistry = BTreeMap<String, f64>;

fn default_max_pct() -> f64 {
    1.0
}

/// One raw charge material as loaded by the external catalog loader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub cost_per_kg: f64,
    /// Available stock in kg
    pub max_stock: f64,
    /// Open category tag, e.g. "acero", "returns", "scrap", "ferroalloy"
    #[serde(rename = "type")]
    pub material_type: String,
    /// Minimum fraction of the total charge this material must represent
    #[serde(default)]
    pub min_pct: f64,
    /// Maximum fraction of the total charge this material may represent
    #[serde(default = "default_max_pct")]
    pub max_pct: f64,
    /// Known compositional range, lower side
    #[serde(default)]
    pub chem_min: Chemistry,
    /// Known compositional range, upper side
    #[serde(default)]
    pub chem_max: Chemistry,
}

impl Material {
    pub fn new(id: impl Into<String>, cost_per_kg: f64, max_stock: f64) -> Self {
        Self {
            id: id.into(),
            cost_per_kg,
            max_stock,
            material_type: "scrap".to_string(),
            min_pct: 0.0,
            max_pct: 1.0,
            chem_min: Chemistry::new(),
            chem_max: Chemistry::new(),
        }
    }

    pub fn with_type(mut self, material_type: impl Into<String>) -> Self {
        self.material_type = material_type.into();
        self
    }

    pub fn with_pct_window(mut self, min_pct: f64, max_pct: f64) -> Self {
        self.min_pct = min_pct;
        self.max_pct = max_pct;
        self
    }

    /// Record the compositional range of one element
    pub fn with_element(mut self, symbol: impl Into<String>, min: f64, max: f64) -> Self {
        let symbol = symbol.into();
        self.chem_min.insert(symbol.clone(), min);
        self.chem_max.insert(symbol, max);
        self
    }

    /// A material missing an entry for an element contributes 0 on both
    /// sides; a lone `chem_min` entry is treated as an exact analysis.
    pub fn chem_range(&self, element: &str) -> (f64, f64) {
        let min = self.chem_min.get(element).copied().unwrap_or(0.0);
        let max = self.chem_max.get(element).copied().unwrap_or(min);
        (min, max)
    }
}

/// Heat specification: target weight, chemistry window and category limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlloyTarget {
    /// Target charge weight in kg
    pub heat_weight: f64,
    #[serde(default)]
    pub chem_target_min: Chemistry,
    #[serde(default)]
    pub chem_target_max: Chemistry,
    /// Minimum fraction of the heat that must be "acero" material
    #[serde(default)]
    pub min_acero_pct: f64,
    /// Maximum fraction of the heat that may be "returns" material
    #[serde(default = "default_max_pct")]
    pub max_returns_pct: f64,
}

impl AlloyTarget {
    pub fn new(heat_weight: f64) -> Self {
        Self {
            heat_weight,
            chem_target_min: Chemistry::new(),
            chem_target_max: Chemistry::new(),
            min_acero_pct: 0.0,
            max_returns_pct: 1.0,
        }
    }

    pub fn with_window(mut self, symbol: impl Into<String>, min: f64, max: f64) -> Self {
        let symbol = symbol.into();
        self.chem_target_min.insert(symbol.clone(), min);
        self.chem_target_max.insert(symbol, max);
        self
    }

    pub fn with_min_acero_pct(mut self, pct: f64) -> Self {
        self.min_acero_pct = pct;
        self
    }

    pub fn with_max_returns_pct(mut self, pct: f64) -> Self {
        self.max_returns_pct = pct;
        self
    }

    pub fn target_range(&self, element: &str) -> (f64, f64) {
        (
            self.chem_target_min.get(element).copied().unwrap_or(0.0),
            self.chem_target_max.get(element).copied().unwrap_or(1.0),
        )
    }
}

/// Immutable material catalog consumed by the optimization core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub materials: Vec<Material>,
}

impl Catalog {
    pub fn new(materials: Vec<Material>) -> Self {
        Self { materials }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Per-variable bounds of the normalized LP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableBounds {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

impl VariableBounds {
    /// Empty feasible interval; infeasibility is a solve-time concern, the
    /// builder only flags it for faster diagnosis.
    pub fn is_pre_infeasible(&self) -> bool {
        self.lower > self.upper
    }
}

/// One linear constraint row with a diagnostic tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintRow {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
    /// Human-readable tag used in warnings and binding-constraint reports
    pub tag: String,
    pub family: ConstraintFamily,
}

impl ConstraintRow {
    pub fn new(
        coefficients: Vec<f64>,
        relation: Relation,
        rhs: f64,
        tag: impl Into<String>,
        family: ConstraintFamily,
    ) -> Self {
        Self {
            coefficients,
            relation,
            rhs,
            tag: tag.into(),
            family,
        }
    }

    pub fn lhs(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(x)
            .map(|(c, v)| c * v)
            .sum()
    }

    /// Signed slack: non-negative when the row holds at `x`. Equality rows
    /// report the negated absolute residual.
    pub fn slack(&self, x: &[f64]) -> f64 {
        let lhs = self.lhs(x);
        match self.relation {
            Relation::Eq => -(lhs - self.rhs).abs(),
            Relation::Le => self.rhs - lhs,
            Relation::Ge => lhs - self.rhs,
        }
    }

    pub fn is_violated(&self, x: &[f64], tolerance: f64) -> bool {
        self.slack(x) < -tolerance
    }
}

/// Normalized linear program: minimize `objective · x` subject to the rows
/// and per-variable bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpModel {
    pub variables: Vec<VariableBounds>,
    pub rows: Vec<ConstraintRow>,
    /// Cost per kg of each material
    pub objective: Vec<f64>,
}

impl LpModel {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x).map(|(c, v)| c * v).sum()
    }
}

/// Usage of one material in an accepted charge
#[derive(Debug, Clone, Serialize)]
pub struct MaterialUsage {
    pub id: String,
    pub lower_kg: f64,
    pub upper_kg: f64,
    pub optimal_kg: f64,
    pub pct_of_charge: f64,
    pub cost: f64,
}

/// Target window vs. achieved worst-case window for one element
#[derive(Debug, Clone, Serialize)]
pub struct ElementWindow {
    pub element: String,
    pub target_min: f64,
    pub target_max: f64,
    pub achieved_min: f64,
    pub achieved_max: f64,
    pub in_spec: bool,
}

/// Accepted charge composition with derived reporting fields
#[derive(Debug, Clone, Serialize)]
pub struct ChargeSolution {
    pub total_cost: f64,
    pub cost_per_ton: f64,
    pub materials: Vec<MaterialUsage>,
    pub chemistry: Vec<ElementWindow>,
    /// Tags of rows with (near-)zero slack at the optimum
    pub binding_constraints: Vec<String>,
    pub warnings: Vec<String>,
}

/// Result of the diagnostic relaxation pass on an infeasible instance
#[derive(Debug, Clone, Serialize)]
pub struct RelaxationReport {
    pub family: ConstraintFamily,
    pub step: RelaxStep,
    pub message: String,
}

/// Terminal state of one optimization request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChargeOutcome {
    Optimal(ChargeSolution),
    /// No feasible point; `diagnosis` localizes the conflicting family when
    /// the relaxation pass finds one
    Infeasible {
        diagnosis: Option<RelaxationReport>,
        warnings: Vec<String>,
    },
    /// Combined upper bounds cannot reach the heat weight
    InsufficientStock {
        available_kg: f64,
        required_kg: f64,
    },
    /// Mandatory minimums alone exceed the heat weight
    OverconstrainedMinimums {
        mandatory_kg: f64,
        heat_weight_kg: f64,
    },
    Timeout {
        budget_ms: u64,
    },
    SolverError {
        detail: String,
    },
}

impl ChargeOutcome {
    pub fn is_optimal(&self) -> bool {
        matches!(self, ChargeOutcome::Optimal(_))
    }
}

/// Melt already in the furnace, used by the trim-addition planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BathState {
    pub weight_kg: f64,
    /// Measured chemistry of the bath (mass fractions)
    pub chemistry: Chemistry,
}

/// Final chemistry window the blended bath must land in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimSpec {
    pub chem_min: Chemistry,
    pub chem_max: Chemistry,
}

/// One material addition proposed by the trim planner
#[derive(Debug, Clone, Serialize)]
pub struct TrimAddition {
    pub id: String,
    pub kg: f64,
    pub cost: f64,
}

/// Least-cost addition plan bringing the bath into the final window
#[derive(Debug, Clone, Serialize)]
pub struct TrimPlan {
    pub additions: Vec<TrimAddition>,
    pub total_addition_kg: f64,
    pub total_cost: f64,
    pub final_weight_kg: f64,
    pub chemistry: Vec<ElementWindow>,
}

/// Terminal state of one trim-addition request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrimOutcome {
    Optimal(TrimPlan),
    /// Trim models carry only chemistry rows, so there is no relaxation
    /// pass to run; infeasibility is reported directly
    Infeasible,
    Timeout { budget_ms: u64 },
    SolverError { detail: String },
}
