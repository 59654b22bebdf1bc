pub mod branch_and_bound;
pub mod hybrid;
pub mod reduction;
pub mod simplex;

pub use branch_and_bound::BranchAndBoundSolver;
pub use hybrid::HybridSolver;
pub use reduction::ReductionSolver;
