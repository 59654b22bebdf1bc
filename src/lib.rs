//! Minimum switch presses for joltage switchboards.
//!
//! Each input line describes switches wired to counters and the value every
//! counter must reach; the crate finds the fewest presses per switchboard
//! by exact integer programming and sums them.

pub mod cache;
pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod models;
pub mod parse;
pub mod server;

pub use config::{ServerConfig, SolverConfig};
pub use domain::solve::{solve_records, Aggregate};
pub use domain::solver::Solver;
pub use domain::solver_factory::{create_solver, SolverType};
pub use error::{FormatError, RunError, SolverError};
pub use models::{IntegerProgram, Mode, Record, Solution, Switch, Switchboard};
