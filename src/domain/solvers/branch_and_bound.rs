use log::{debug, trace};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::domain::linalg::{rational, reduce};
use crate::domain::solver::Solver;
use crate::domain::solvers::simplex::{relax, Relaxation};
use crate::domain::validate::{is_valid_solution, trivial_solution};
use crate::error::SolverError;
use crate::models::{IntegerProgram, Solution};

/// Box of press counts still under consideration.
#[derive(Debug, Clone)]
struct Node {
    lower: Vec<u64>,
    upper: Vec<u64>,
}

/// Depth-first branch-and-bound over the exact LP relaxation.
pub struct BranchAndBoundSolver {
    node_limit: u64,
}

impl BranchAndBoundSolver {
    pub fn new(node_limit: u64) -> Self {
        BranchAndBoundSolver { node_limit }
    }

    fn search(&self, program: &IntegerProgram) -> Result<Solution, SolverError> {
        let s = program.num_switches();
        let mut stack = vec![Node {
            lower: vec![0; s],
            upper: program.upper_bounds(),
        }];
        let mut best: Option<Solution> = None;
        let mut explored = 0u64;
        let mut overflowed = false;

        while let Some(node) = stack.pop() {
            if explored >= self.node_limit {
                return Err(SolverError::ResourceExhausted {
                    limit: self.node_limit,
                    explored,
                });
            }
            explored += 1;

            let (values, objective) = match relax(program, &node.lower, &node.upper) {
                Relaxation::Optimal { values, objective } => (values, objective),
                Relaxation::Infeasible => continue,
            };

            // The objective is integral, so the relaxed bound rounds up.
            let bound = objective.ceil();
            if let Some(best) = &best {
                if bound >= rational(best.total) {
                    trace!("pruned node with bound {}", bound);
                    continue;
                }
            }

            match most_fractional(&values) {
                None => {
                    let presses: Option<Vec<u64>> =
                        values.iter().map(|v| v.to_integer().to_u64()).collect();
                    match presses.map(Solution::new) {
                        Some(Ok(candidate)) => {
                            debug!("incumbent {} after {} nodes", candidate.total, explored);
                            best = Some(candidate);
                        }
                        _ => overflowed = true,
                    }
                }
                Some(j) => {
                    let Some(floor) = values[j].floor().to_integer().to_u64() else {
                        continue;
                    };
                    trace!("branching on switch {} at {}", j, values[j]);

                    let mut up = node.clone();
                    up.lower[j] = floor + 1;
                    let mut down = node;
                    down.upper[j] = floor;

                    stack.push(up);
                    stack.push(down);
                }
            }
        }

        debug!("branch-and-bound explored {} nodes", explored);
        match best {
            Some(best) => Ok(best),
            None if overflowed => Err(SolverError::Overflow),
            None => Err(diagnose(program)),
        }
    }
}

/// The switch whose relaxed value is furthest from an integer, lowest index first.
fn most_fractional(values: &[BigRational]) -> Option<usize> {
    let half = BigRational::new(BigInt::from(1), BigInt::from(2));
    let mut chosen: Option<(usize, BigRational)> = None;
    for (j, value) in values.iter().enumerate() {
        let fraction = value - value.floor();
        if fraction.is_zero() {
            continue;
        }
        let distance = (&fraction - &half).abs();
        if chosen.as_ref().map_or(true, |(_, best)| distance < *best) {
            chosen = Some((j, distance));
        }
    }
    chosen.map(|(j, _)| j)
}

/// Name the contradicting counters when the equalities alone rule out a solution.
fn diagnose(program: &IntegerProgram) -> SolverError {
    match reduce(program) {
        Err(error) => error,
        Ok(_) => SolverError::infeasible(),
    }
}

impl Solver for BranchAndBoundSolver {
    fn solve(&self, program: &IntegerProgram) -> Result<Solution, SolverError> {
        if let Some(result) = trivial_solution(program) {
            return result;
        }

        let solution = self.search(program)?;
        debug_assert!(is_valid_solution(program, &solution));
        Ok(solution)
    }

    fn name(&self) -> &str {
        "branch-and-bound"
    }
}
