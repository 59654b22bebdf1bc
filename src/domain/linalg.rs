//! Exact Gaussian elimination of `A^T x = b` over the rationals.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::error::SolverError;
use crate::models::IntegerProgram;

/// Reduced row echelon form of the counter equalities.
///
/// Row `k` reads `x[pivots[k]] + sum(coefficients[k][j] * x[j] for j in free) = rhs[k]`.
#[derive(Debug, Clone)]
pub struct Echelon {
    pub pivots: Vec<usize>,
    pub free: Vec<usize>,
    /// Dense rows over all switches; pivot columns are unit vectors.
    pub coefficients: Vec<Vec<BigRational>>,
    pub rhs: Vec<BigRational>,
}

impl Echelon {
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }
}

pub fn rational(value: u64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

/// Row-reduce the system of `program`.
///
/// Each row also carries the combination of original counter equalities
/// that produced it, so an inconsistent row `0 = c` names the counters
/// that contradict each other.
pub fn reduce(program: &IntegerProgram) -> Result<Echelon, SolverError> {
    let s = program.num_switches();
    let n = program.num_counters();

    let mut matrix: Vec<Vec<BigRational>> = (0..n)
        .map(|i| {
            (0..s)
                .map(|j| rational(u64::from(program.incidence[j][i])))
                .collect()
        })
        .collect();
    let mut rhs: Vec<BigRational> = program.targets.iter().map(|&t| rational(t)).collect();
    let mut origin: Vec<Vec<BigRational>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|k| if k == i { BigRational::one() } else { BigRational::zero() })
                .collect()
        })
        .collect();

    let mut pivots = Vec::new();
    let mut free = Vec::new();
    let mut row = 0;

    for col in 0..s {
        let Some(found) = (row..n).find(|&r| !matrix[r][col].is_zero()) else {
            free.push(col);
            continue;
        };
        matrix.swap(row, found);
        rhs.swap(row, found);
        origin.swap(row, found);

        let inv = matrix[row][col].recip();
        scale(&mut matrix[row], &inv);
        scale(&mut origin[row], &inv);
        rhs[row] = &rhs[row] * &inv;

        for r in 0..n {
            if r == row || matrix[r][col].is_zero() {
                continue;
            }
            let factor = matrix[r][col].clone();
            let (pivot_row, target_row) = pick(&mut matrix, row, r);
            subtract_scaled(target_row, pivot_row, &factor);
            let (pivot_origin, target_origin) = pick(&mut origin, row, r);
            subtract_scaled(target_origin, pivot_origin, &factor);
            let delta = &rhs[row] * &factor;
            rhs[r] -= delta;
        }

        pivots.push(col);
        row += 1;
    }

    if let Some(bad) = (row..n).find(|&r| !rhs[r].is_zero()) {
        let counters = origin[bad]
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, _)| i)
            .collect();
        return Err(SolverError::Infeasible { counters });
    }

    matrix.truncate(row);
    rhs.truncate(row);

    Ok(Echelon {
        pivots,
        free,
        coefficients: matrix,
        rhs,
    })
}

fn scale(row: &mut [BigRational], factor: &BigRational) {
    for value in row.iter_mut() {
        if !value.is_zero() {
            *value = &*value * factor;
        }
    }
}

fn subtract_scaled(target: &mut [BigRational], source: &[BigRational], factor: &BigRational) {
    for (t, s) in target.iter_mut().zip(source) {
        if !s.is_zero() {
            *t -= s * factor;
        }
    }
}

/// Borrow row `a` immutably and row `b` mutably.
fn pick<T>(rows: &mut [Vec<T>], a: usize, b: usize) -> (&[T], &mut [T]) {
    if a < b {
        let (head, tail) = rows.split_at_mut(b);
        (head[a].as_slice(), tail[0].as_mut_slice())
    } else {
        let (head, tail) = rows.split_at_mut(a);
        (tail[0].as_slice(), head[b].as_mut_slice())
    }
}
