use log::info;
use rayon::prelude::*;

use crate::convert::to_integer_program;
use crate::domain::lights::{min_toggle_presses, LightsError};
use crate::domain::solver::Solver;
use crate::error::{RunError, SolverError};
use crate::models::{Mode, Record, Solution};

/// Per-switchboard minima and their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub total: u64,
    /// `(line, solution)` in input order.
    pub solutions: Vec<(usize, Solution)>,
}

/// Solve each record independently and sum the minima.
///
/// Results are gathered in input order and the first failure in that
/// order is returned, whether or not the solves ran in parallel.
pub fn aggregate<F>(records: &[Record], parallel: bool, solve_one: F) -> Result<Aggregate, RunError>
where
    F: Fn(usize, &Record) -> Result<Solution, RunError> + Sync,
{
    let results: Vec<Result<Solution, RunError>> = if parallel {
        records
            .par_iter()
            .enumerate()
            .map(|(index, record)| solve_one(index, record))
            .collect()
    } else {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| solve_one(index, record))
            .collect()
    };

    let mut solutions = Vec::with_capacity(records.len());
    let mut total = 0u64;
    for (record, result) in records.iter().zip(results) {
        let solution = result?;
        total = total
            .checked_add(solution.total)
            .ok_or(RunError::TotalOverflow { line: record.line })?;
        solutions.push((record.line, solution));
    }
    info!("solved {} switchboards, total {}", solutions.len(), total);

    Ok(Aggregate { total, solutions })
}

/// Attach the location of a switchboard to a solver failure.
pub fn locate(index: usize, record: &Record, source: SolverError) -> RunError {
    RunError::Solve {
        line: record.line,
        index,
        source,
    }
}

/// Minimum total presses for the joltage targets of every record.
pub fn solve_joltage(
    records: &[Record],
    solver: &dyn Solver,
    parallel: bool,
) -> Result<Aggregate, RunError> {
    aggregate(records, parallel, |index, record| {
        solver
            .solve(&to_integer_program(&record.switchboard))
            .map_err(|source| locate(index, record, source))
    })
}

/// Minimum total presses for the light patterns of every record.
pub fn solve_lights(records: &[Record], limit: u64, parallel: bool) -> Result<Aggregate, RunError> {
    aggregate(records, parallel, |index, record| {
        min_toggle_presses(&record.switchboard, limit).map_err(|error| match error {
            LightsError::Format(source) => RunError::Format {
                line: record.line,
                source,
            },
            LightsError::Solve(source) => locate(index, record, source),
        })
    })
}

/// Dispatch on `mode`; lights mode reuses the enumeration budget.
pub fn solve_records(
    records: &[Record],
    mode: Mode,
    solver: &dyn Solver,
    enumeration_limit: u64,
    parallel: bool,
) -> Result<Aggregate, RunError> {
    match mode {
        Mode::Joltage => solve_joltage(records, solver, parallel),
        Mode::Lights => solve_lights(records, enumeration_limit, parallel),
    }
}
