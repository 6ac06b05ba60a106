//! Least-cost charge mix optimization for electric-arc-furnace heats.
//!
//! The core translates a material catalog and an alloy target into a
//! constrained linear program, seeds a warm start, solves through a
//! pluggable LP backend and interprets the result, including localizing
//! the conflicting constraint family when the instance is infeasible.

// Domain layer: catalog records, LP description, solver contract
pub mod domain;

// Application layer: builder, constraint engine, seeder, interpreter,
// diagnosis, orchestration, trim planning
pub mod application;

// Solver adapters: concrete backends and the bounded async adapter
pub mod solver;

// Re-export commonly used types
pub use domain::{
    AlloyTarget, BathState, Catalog, ChargeOutcome, ChargeSolution, Chemistry, ConstraintFamily,
    ConstraintRow, ElementWindow, LpBackend, LpModel, Material, MaterialUsage, Relation,
    RelaxStep, RelaxationReport, SolveOutcome, SolveStats, SolverError, TrimOutcome, TrimPlan,
    TrimSpec, VariableBounds,
};

pub use application::{ChargeOptimizer, InvalidData, OptimizerConfig, ProblemBuilder};

pub use solver::{AdapterOutcome, BackendKind, MicrolpSolver, SolverAdapter, SolverFactory};

#[cfg(feature = "coin-cbc")]
pub use solver::CoinCbcSolver;
