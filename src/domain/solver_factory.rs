use crate::config::SolverConfig;
use crate::domain::solver::Solver;
use crate::domain::solvers::{BranchAndBoundSolver, HybridSolver, ReductionSolver};

/// Available solving strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverType {
    #[default]
    Auto,
    Reduction,
    BranchAndBound,
}

impl SolverType {
    /// Parse solver type from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(SolverType::Auto),
            "reduction" => Some(SolverType::Reduction),
            "branch-and-bound" | "bnb" => Some(SolverType::BranchAndBound),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverType::Auto => "auto",
            SolverType::Reduction => "reduction",
            SolverType::BranchAndBound => "branch-and-bound",
        }
    }
}

/// Create a solver instance for the configured strategy and limits.
///
/// Each switchboard may get its own instance; solvers hold no state
/// between calls.
pub fn create_solver(config: &SolverConfig) -> Box<dyn Solver> {
    match config.solver {
        SolverType::Auto => Box::new(HybridSolver::new(
            config.enumeration_limit,
            config.node_limit,
        )),
        SolverType::Reduction => Box::new(ReductionSolver::new(config.enumeration_limit)),
        SolverType::BranchAndBound => Box::new(BranchAndBoundSolver::new(config.node_limit)),
    }
}
