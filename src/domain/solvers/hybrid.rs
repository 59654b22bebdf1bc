use log::debug;

use crate::domain::solver::Solver;
use crate::domain::solvers::branch_and_bound::BranchAndBoundSolver;
use crate::domain::solvers::reduction::Reduction;
use crate::domain::validate::{is_valid_solution, trivial_solution};
use crate::error::SolverError;
use crate::models::{IntegerProgram, Solution};

/// Enumerates the null space when it is small, otherwise falls back to
/// branch-and-bound.
pub struct HybridSolver {
    enumeration_limit: u64,
    fallback: BranchAndBoundSolver,
}

impl HybridSolver {
    pub fn new(enumeration_limit: u64, node_limit: u64) -> Self {
        HybridSolver {
            enumeration_limit,
            fallback: BranchAndBoundSolver::new(node_limit),
        }
    }
}

impl Solver for HybridSolver {
    fn solve(&self, program: &IntegerProgram) -> Result<Solution, SolverError> {
        if let Some(result) = trivial_solution(program) {
            return result;
        }

        // Inconsistent equalities surface here, with the counters involved.
        let reduction = Reduction::new(program)?;
        let nodes = reduction.search_size();

        // Within the limit the enumeration cannot run out of budget.
        let solution = if nodes <= u128::from(self.enumeration_limit) {
            debug!(
                "enumerating at most {} nodes over {} free switches",
                nodes,
                reduction.free_count()
            );
            reduction.minimize(self.enumeration_limit)?
        } else {
            debug!(
                "{} nodes over {} free switches exceed {}, using {}",
                nodes,
                reduction.free_count(),
                self.enumeration_limit,
                self.fallback.name()
            );
            self.fallback.solve(program)?
        };

        debug_assert!(is_valid_solution(program, &solution));
        Ok(solution)
    }

    fn name(&self) -> &str {
        "auto"
    }
}
