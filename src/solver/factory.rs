use crate::domain::solver_service::LpBackend;
use crate::solver::MicrolpSolver;
use std::sync::Arc;

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Pure-Rust simplex, always available
    Microlp,
    #[cfg(feature = "coin-cbc")]
    CoinCbc,
}

/// Factory for creating backend instances
pub struct SolverFactory;

impl SolverFactory {
    pub fn create(kind: BackendKind) -> Arc<dyn LpBackend> {
        match kind {
            BackendKind::Microlp => Arc::new(MicrolpSolver::new()),
            #[cfg(feature = "coin-cbc")]
            BackendKind::CoinCbc => Arc::new(crate::solver::CoinCbcSolver::new()),
        }
    }

    /// Default backend (microlp)
    pub fn default_backend() -> Arc<dyn LpBackend> {
        Self::create(BackendKind::Microlp)
    }
}
