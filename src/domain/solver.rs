use crate::error::SolverError;
use crate::models::{IntegerProgram, Solution};

/// Common interface for the minimum-press integer program solvers
pub trait Solver: Send + Sync {
    /// Minimize the total number of presses of one switchboard
    ///
    /// # Arguments
    /// * `program` - The equalities `A^T x = b` with `x >= 0` integer
    ///
    /// # Returns
    /// The press count per switch and their sum, or why none could be found
    fn solve(&self, program: &IntegerProgram) -> Result<Solution, SolverError>;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;
}
