//! Null-space reduction: every solution of `A^T x = b` is fixed by the
//! values of the free (non-pivot) switches, so the integer search only
//! ranges over those.

use log::{debug, trace};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::domain::linalg::{rational, reduce, Echelon};
use crate::domain::solver::Solver;
use crate::domain::validate::{is_valid_solution, trivial_solution};
use crate::error::SolverError;
use crate::models::{IntegerProgram, Solution};

/// One pivot row scaled to integers:
/// `denominator * x[pivot] = rhs - sum(coefficients[f] * x[free[f]])`.
#[derive(Debug, Clone)]
struct PivotRow {
    pivot: usize,
    denominator: BigInt,
    rhs: BigInt,
    coefficients: Vec<BigInt>,
    /// `tail_slack[d]`: the most the free variables `d..` can add back to `rhs`.
    tail_slack: Vec<BigInt>,
}

/// The system after elimination, ready for enumeration of the free switches.
#[derive(Debug, Clone)]
pub struct Reduction {
    num_switches: usize,
    free: Vec<usize>,
    free_bounds: Vec<u64>,
    rows: Vec<PivotRow>,
    /// Objective change per unit of each free variable.
    free_cost: Vec<BigRational>,
    /// Objective value with every free variable at zero.
    base_cost: BigRational,
    /// `tail_cost[d]`: the lowest the free variables `d..` can move the objective.
    tail_cost: Vec<BigRational>,
}

struct Search {
    budget: u64,
    explored: u64,
    best: Option<Solution>,
    /// Some candidate met every equality but its total did not fit in a `u64`.
    overflowed: bool,
}

impl Reduction {
    pub fn new(program: &IntegerProgram) -> Result<Self, SolverError> {
        let echelon = reduce(program)?;
        Ok(Self::from_echelon(program, echelon))
    }

    fn from_echelon(program: &IntegerProgram, echelon: Echelon) -> Self {
        let bounds = program.upper_bounds();
        let free_bounds: Vec<u64> = echelon.free.iter().map(|&f| bounds[f]).collect();

        let free_cost: Vec<BigRational> = echelon
            .free
            .iter()
            .map(|&f| {
                echelon
                    .coefficients
                    .iter()
                    .fold(BigRational::one(), |acc, row| acc - &row[f])
            })
            .collect();
        let base_cost = echelon
            .rhs
            .iter()
            .fold(BigRational::zero(), |acc, v| acc + v);

        let mut tail_cost = vec![BigRational::zero(); echelon.free.len() + 1];
        for d in (0..echelon.free.len()).rev() {
            let lowest = if free_cost[d].is_negative() {
                &free_cost[d] * rational(free_bounds[d])
            } else {
                BigRational::zero()
            };
            tail_cost[d] = &tail_cost[d + 1] + lowest;
        }

        let rows = echelon
            .pivots
            .iter()
            .enumerate()
            .map(|(k, &pivot)| {
                let row = &echelon.coefficients[k];
                let denominator = echelon
                    .free
                    .iter()
                    .map(|&f| row[f].denom())
                    .fold(echelon.rhs[k].denom().clone(), |acc, d| acc.lcm(d));
                let scale = BigRational::from_integer(denominator.clone());
                let rhs = (&echelon.rhs[k] * &scale).to_integer();
                let coefficients: Vec<BigInt> = echelon
                    .free
                    .iter()
                    .map(|&f| (&row[f] * &scale).to_integer())
                    .collect();

                let mut tail_slack = vec![BigInt::zero(); coefficients.len() + 1];
                for d in (0..coefficients.len()).rev() {
                    let gain = if coefficients[d].is_negative() {
                        -&coefficients[d] * BigInt::from(free_bounds[d])
                    } else {
                        BigInt::zero()
                    };
                    tail_slack[d] = &tail_slack[d + 1] + gain;
                }

                PivotRow {
                    pivot,
                    denominator,
                    rhs,
                    coefficients,
                    tail_slack,
                }
            })
            .collect();

        Reduction {
            num_switches: program.num_switches(),
            free: echelon.free,
            free_bounds,
            rows,
            free_cost,
            base_cost,
            tail_cost,
        }
    }

    /// Number of switches left undetermined by the equalities.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Size of the box the free switches range over.
    pub fn candidate_count(&self) -> u128 {
        self.free_bounds
            .iter()
            .fold(1u128, |acc, &u| acc.saturating_mul(u128::from(u) + 1))
    }

    /// Most search nodes `minimize` can visit: every prefix of free values,
    /// the empty one included.
    pub fn search_size(&self) -> u128 {
        let mut level = 1u128;
        let mut total = 1u128;
        for &u in &self.free_bounds {
            level = level.saturating_mul(u128::from(u) + 1);
            total = total.saturating_add(level);
        }
        total
    }

    /// Find the cheapest non-negative integer solution.
    ///
    /// `budget` caps the number of search nodes visited, pruned ones included.
    pub fn minimize(&self, budget: u64) -> Result<Solution, SolverError> {
        let mut search = Search {
            budget,
            explored: 0,
            best: None,
            overflowed: false,
        };
        let residual: Vec<BigInt> = self.rows.iter().map(|row| row.rhs.clone()).collect();
        let mut free_values = vec![0u64; self.free.len()];

        self.search(0, &residual, self.base_cost.clone(), &mut free_values, &mut search)?;

        debug!(
            "reduction visited {} nodes over {} free switches",
            search.explored,
            self.free.len()
        );
        match search.best {
            Some(best) => Ok(best),
            None if search.overflowed => Err(SolverError::Overflow),
            None => Err(SolverError::infeasible()),
        }
    }

    fn search(
        &self,
        depth: usize,
        residual: &[BigInt],
        cost: BigRational,
        free_values: &mut [u64],
        search: &mut Search,
    ) -> Result<(), SolverError> {
        search.explored += 1;
        if search.explored > search.budget {
            return Err(SolverError::ResourceExhausted {
                limit: search.budget,
                explored: search.explored,
            });
        }

        if let Some(best) = &search.best {
            if &cost + &self.tail_cost[depth] >= rational(best.total) {
                return Ok(());
            }
        }
        let reachable = self
            .rows
            .iter()
            .zip(residual)
            .all(|(row, r)| !(r + &row.tail_slack[depth]).is_negative());
        if !reachable {
            return Ok(());
        }

        if depth == self.free.len() {
            self.complete(residual, free_values, search);
            return Ok(());
        }

        let mut level = residual.to_vec();
        let mut level_cost = cost;
        for value in 0..=self.free_bounds[depth] {
            if value > 0 {
                for (r, row) in level.iter_mut().zip(&self.rows) {
                    *r -= &row.coefficients[depth];
                }
                level_cost += &self.free_cost[depth];
            }

            // Rows this variable only drains can never recover once short.
            let drained = self.rows.iter().zip(&level).any(|(row, r)| {
                row.coefficients[depth].is_positive()
                    && (r + &row.tail_slack[depth + 1]).is_negative()
            });
            if drained {
                break;
            }
            // Larger values only cost more once the incumbent is out of reach.
            if !self.free_cost[depth].is_negative() {
                if let Some(best) = &search.best {
                    if &level_cost + &self.tail_cost[depth + 1] >= rational(best.total) {
                        break;
                    }
                }
            }

            free_values[depth] = value;
            trace!("free switch {} = {}", self.free[depth], value);
            self.search(depth + 1, &level, level_cost.clone(), free_values, search)?;
        }
        free_values[depth] = 0;
        Ok(())
    }

    fn complete(
        &self,
        residual: &[BigInt],
        free_values: &[u64],
        search: &mut Search,
    ) {
        let mut presses = vec![0u64; self.num_switches];
        for (&f, &value) in self.free.iter().zip(free_values) {
            presses[f] = value;
        }
        for (row, r) in self.rows.iter().zip(residual) {
            if r.is_negative() || !r.is_multiple_of(&row.denominator) {
                return;
            }
            match (r / &row.denominator).to_u64() {
                Some(value) => presses[row.pivot] = value,
                None => return,
            }
        }

        let Ok(candidate) = Solution::new(presses) else {
            search.overflowed = true;
            return;
        };
        if search.best.as_ref().map_or(true, |best| candidate.total < best.total) {
            search.best = Some(candidate);
        }
    }
}

/// Solves by reduction alone; fails with `ResourceExhausted` when the
/// search visits more nodes than the budget allows.
pub struct ReductionSolver {
    enumeration_limit: u64,
}

impl ReductionSolver {
    pub fn new(enumeration_limit: u64) -> Self {
        ReductionSolver { enumeration_limit }
    }
}

impl Solver for ReductionSolver {
    fn solve(&self, program: &IntegerProgram) -> Result<Solution, SolverError> {
        if let Some(result) = trivial_solution(program) {
            return result;
        }

        let reduction = Reduction::new(program)?;
        debug!(
            "{} switches, {} free, {} candidates",
            program.num_switches(),
            reduction.free_count(),
            reduction.candidate_count()
        );
        let solution = reduction.minimize(self.enumeration_limit)?;
        debug_assert!(is_valid_solution(program, &solution));
        Ok(solution)
    }

    fn name(&self) -> &str {
        "reduction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::to_integer_program;
    use crate::parse::parse_line;

    fn program(line: &str) -> IntegerProgram {
        to_integer_program(&parse_line(line).unwrap())
    }

    fn solve(line: &str) -> Result<Solution, SolverError> {
        ReductionSolver::new(1_000_000).solve(&program(line))
    }

    #[test]
    fn test_independent_switches() {
        let solution = solve("[2] (0) (1) (2) {3,4,5}").unwrap();
        assert_eq!(solution.presses, vec![3, 4, 5]);
        assert_eq!(solution.total, 12);
    }

    #[test]
    fn test_inconsistent_system_is_infeasible() {
        assert_eq!(
            solve("[1] (0,1) (1,2) {2,2,1}"),
            Err(SolverError::Infeasible { counters: vec![0, 1, 2] })
        );
    }

    #[test]
    fn test_prefers_shared_switch() {
        // x0 + x2 = 3, x1 + x2 = 4: pressing the shared switch 3 times is cheapest
        let solution = solve("[x] (0) (1) (0,1) {3,4}").unwrap();
        assert_eq!(solution.presses, vec![0, 1, 3]);
        assert_eq!(solution.total, 4);
    }

    #[test]
    fn test_fractional_only_solution_is_infeasible() {
        assert_eq!(solve("[x] (0,2) (0,1) (1,2) {1,1,1}"), Err(SolverError::infeasible()));
    }

    #[test]
    fn test_puzzle_examples() {
        assert_eq!(solve("[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}").unwrap().total, 10);
        assert_eq!(solve("[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}").unwrap().total, 12);
        assert_eq!(solve("[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}").unwrap().total, 11);
    }

    #[test]
    fn test_zero_switch_is_never_pressed() {
        let solution = solve("[x] () (0) {2}").unwrap();
        assert_eq!(solution.presses, vec![0, 2]);
    }

    #[test]
    fn test_budget_exhaustion_is_reported() {
        let result = ReductionSolver::new(1).solve(&program("[x] (0) (1) (0,1) {3,4}"));
        assert!(matches!(
            result,
            Err(SolverError::ResourceExhausted { limit: 1, .. })
        ));
    }

    #[test]
    fn test_pruned_nodes_count_against_budget() {
        // Seven free switches with wide domains; pruning alone never finishes.
        let board = program("[.#.#] (2) (0) (0,3) (1,3) (2,3) (2) (1) (0,1) (3) (2) (0,1) {80,68,95,78}");
        assert_eq!(Reduction::new(&board).unwrap().free_count(), 7);

        let result = ReductionSolver::new(1_000).solve(&board);
        assert_eq!(
            result,
            Err(SolverError::ResourceExhausted { limit: 1_000, explored: 1_001 })
        );
    }

    #[test]
    fn test_total_beyond_u64_is_overflow() {
        assert_eq!(solve("[a] (0) (1) {18446744073709551615,1}"), Err(SolverError::Overflow));
    }

    #[test]
    fn test_candidate_count_and_search_size() {
        let reduction = Reduction::new(&program("[x] (0) (1) (0,1) {3,4}")).unwrap();
        assert_eq!(reduction.free_count(), 1);
        assert_eq!(reduction.candidate_count(), 4);
        assert_eq!(reduction.search_size(), 5);
    }
}
