// Domain value objects representing core charge-optimization concepts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relational operator of a constraint row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// Equal (=)
    Eq,
    /// Less than or equal (≤)
    Le,
    /// Greater than or equal (≥)
    Ge,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Eq => write!(f, "="),
            Relation::Le => write!(f, "<="),
            Relation::Ge => write!(f, ">="),
        }
    }
}

/// Constraint family a row belongs to, used for diagnostics and the
/// infeasibility relaxation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    /// Total charge weight equality
    Weight,
    /// Per-material percentage bounds (kept as variable bounds)
    Percentage,
    /// Category aggregates (acero minimum, returns maximum)
    Category,
    /// Worst-case chemistry window rows
    Chemistry,
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintFamily::Weight => write!(f, "total weight"),
            ConstraintFamily::Percentage => write!(f, "percentage bounds"),
            ConstraintFamily::Category => write!(f, "category limits"),
            ConstraintFamily::Chemistry => write!(f, "chemistry bounds"),
        }
    }
}

/// One step of the diagnostic relaxation schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxStep {
    /// Loosen the family's bounds by the given fraction (0.10 = 10%)
    Loosen(f64),
    /// Remove the family entirely
    Drop,
}

impl fmt::Display for RelaxStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelaxStep::Loosen(frac) => write!(f, "{:.0}%", frac * 100.0),
            RelaxStep::Drop => write!(f, "removal"),
        }
    }
}

/// Progress of one optimization request through the pipeline; terminal
/// statuses are carried by `ChargeOutcome`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Built,
    Seeded,
    Solved,
    Reported,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStage::Built => write!(f, "built"),
            RequestStage::Seeded => write!(f, "seeded"),
            RequestStage::Solved => write!(f, "solved"),
            RequestStage::Reported => write!(f, "reported"),
        }
    }
}
