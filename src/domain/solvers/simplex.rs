//! Exact two-phase simplex for the LP relaxation
//! `minimize sum(x) subject to A^T x = b, lower <= x <= upper`.

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::domain::linalg::rational;
use crate::models::IntegerProgram;

#[derive(Debug, Clone, PartialEq)]
pub enum Relaxation {
    Optimal {
        values: Vec<BigRational>,
        objective: BigRational,
    },
    Infeasible,
}

/// Dense tableau; the last entry of every row is its right-hand side.
struct Tableau {
    rows: Vec<Vec<BigRational>>,
    basis: Vec<usize>,
    pivots: u64,
}

impl Tableau {
    fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len() - 1)
    }

    fn rhs(&self, row: usize) -> &BigRational {
        let last = self.rows[row].len() - 1;
        &self.rows[row][last]
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let inv = self.rows[row][col].recip();
        for value in self.rows[row].iter_mut() {
            if !value.is_zero() {
                *value = &*value * &inv;
            }
        }

        let pivot_row = self.rows[row].clone();
        for (r, target) in self.rows.iter_mut().enumerate() {
            if r == row || target[col].is_zero() {
                continue;
            }
            let factor = target[col].clone();
            for (t, p) in target.iter_mut().zip(&pivot_row) {
                if !p.is_zero() {
                    *t -= p * &factor;
                }
            }
        }
        self.basis[row] = col;
        self.pivots += 1;
    }

    /// Minimize `cost` over the columns below `allowed`, using Bland's rule
    /// so degenerate pivots cannot cycle.
    fn optimize(&mut self, cost: &[BigRational], allowed: usize) {
        let width = self.width();
        let mut reduced: Vec<BigRational> = cost.to_vec();
        reduced.push(BigRational::zero());
        for (r, &b) in self.basis.iter().enumerate() {
            if cost[b].is_zero() {
                continue;
            }
            for (d, v) in reduced.iter_mut().zip(&self.rows[r]) {
                *d -= v * &cost[b];
            }
        }

        loop {
            let Some(enter) = (0..allowed).find(|&c| reduced[c].is_negative()) else {
                break;
            };

            let mut leave: Option<(usize, BigRational)> = None;
            for r in 0..self.rows.len() {
                let entry = &self.rows[r][enter];
                if !entry.is_positive() {
                    continue;
                }
                let ratio = self.rhs(r) / entry;
                let better = match &leave {
                    None => true,
                    Some((best, best_ratio)) => {
                        ratio < *best_ratio
                            || (ratio == *best_ratio && self.basis[r] < self.basis[*best])
                    }
                };
                if better {
                    leave = Some((r, ratio));
                }
            }
            // Every variable is boxed, so a blocking row always exists.
            let Some((row, _)) = leave else {
                break;
            };

            self.pivot(row, enter);
            let factor = reduced[enter].clone();
            for (d, v) in reduced.iter_mut().zip(&self.rows[row]).take(width + 1) {
                *d -= v * &factor;
            }
        }
    }
}

/// Solve the relaxation of `program` with per-switch bounds.
pub fn relax(program: &IntegerProgram, lower: &[u64], upper: &[u64]) -> Relaxation {
    if lower.iter().zip(upper).any(|(l, u)| l > u) {
        return Relaxation::Infeasible;
    }

    let s = program.num_switches();
    let n = program.num_counters();
    // columns: shifted switches y = x - lower, bound slacks, artificials, rhs
    let width = 2 * s + n;

    let mut rows = Vec::with_capacity(n + s);
    for i in 0..n {
        let used = (0..s)
            .filter(|&j| program.incidence[j][i] != 0)
            .fold(BigRational::zero(), |acc, j| acc + rational(lower[j]));
        let mut rhs = rational(program.targets[i]) - used;
        let sign = if rhs.is_negative() {
            rhs = -rhs;
            -BigRational::one()
        } else {
            BigRational::one()
        };

        let mut row = vec![BigRational::zero(); width + 1];
        for j in 0..s {
            if program.incidence[j][i] != 0 {
                row[j] = sign.clone();
            }
        }
        row[2 * s + i] = BigRational::one();
        row[width] = rhs;
        rows.push(row);
    }
    for j in 0..s {
        let mut row = vec![BigRational::zero(); width + 1];
        row[j] = BigRational::one();
        row[s + j] = BigRational::one();
        row[width] = rational(upper[j] - lower[j]);
        rows.push(row);
    }

    let basis: Vec<usize> = (0..n).map(|i| 2 * s + i).chain(s..2 * s).collect();
    let mut tableau = Tableau {
        rows,
        basis,
        pivots: 0,
    };

    let phase_one: Vec<BigRational> = (0..width)
        .map(|c| if c >= 2 * s { BigRational::one() } else { BigRational::zero() })
        .collect();
    tableau.optimize(&phase_one, width);

    let residual = tableau
        .basis
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b >= 2 * s)
        .fold(BigRational::zero(), |acc, (r, _)| acc + tableau.rhs(r));
    if residual.is_positive() {
        return Relaxation::Infeasible;
    }

    // Drive artificials left at zero out of the basis; rows where that is
    // impossible are redundant and stay inert.
    for r in 0..tableau.rows.len() {
        if tableau.basis[r] < 2 * s {
            continue;
        }
        if let Some(col) = (0..2 * s).find(|&c| !tableau.rows[r][c].is_zero()) {
            tableau.pivot(r, col);
        }
    }

    let phase_two: Vec<BigRational> = (0..width)
        .map(|c| if c < s { BigRational::one() } else { BigRational::zero() })
        .collect();
    tableau.optimize(&phase_two, 2 * s);

    let mut values: Vec<BigRational> = lower.iter().map(|&l| rational(l)).collect();
    for (r, &b) in tableau.basis.iter().enumerate() {
        if b < s {
            values[b] += tableau.rhs(r);
        }
    }
    let objective = values.iter().fold(BigRational::zero(), |acc, v| acc + v);
    log::trace!("relaxation solved in {} pivots", tableau.pivots);

    Relaxation::Optimal { values, objective }
}
