// Solver adapters: concrete backends behind the LpBackend contract plus
// the bounded async adapter

pub mod adapter;
#[cfg(feature = "coin-cbc")]
pub mod coin_cbc_solver;
pub mod factory;
pub mod microlp_solver;

pub use adapter::{AdapterOutcome, SolverAdapter};
#[cfg(feature = "coin-cbc")]
pub use coin_cbc_solver::CoinCbcSolver;
pub use factory::{BackendKind, SolverFactory};
pub use microlp_solver::MicrolpSolver;
