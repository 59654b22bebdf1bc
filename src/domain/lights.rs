//! Indicator-light mode: switches toggle lights instead of incrementing
//! counters, so each switch is pressed at most once.

use log::debug;

use crate::domain::validate::validate_indices;
use crate::error::{FormatError, SolverError};
use crate::models::{Solution, Switchboard};
use crate::parse::light_pattern;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightsError {
    Format(FormatError),
    Solve(SolverError),
}

impl From<FormatError> for LightsError {
    fn from(error: FormatError) -> Self {
        LightsError::Format(error)
    }
}

impl From<SolverError> for LightsError {
    fn from(error: SolverError) -> Self {
        LightsError::Solve(error)
    }
}

/// Fewest presses that turn the all-off panel into the label's pattern.
///
/// Walks every subset of switches in Gray-code order, so consecutive
/// subsets differ by a single toggle.
pub fn min_toggle_presses(board: &Switchboard, limit: u64) -> Result<Solution, LightsError> {
    let pattern = light_pattern(&board.label)?;
    validate_indices(board, pattern.len())?;

    let s = board.switches.len();
    let subsets = if s < 64 { 1u64 << s } else { u64::MAX };
    if s >= 64 || subsets > limit {
        return Err(SolverError::ResourceExhausted {
            limit,
            explored: 0,
        }
        .into());
    }

    let mut lights = vec![false; pattern.len()];
    let mut best: Option<u64> = (lights == pattern).then_some(0);
    let mut gray = 0u64;

    for step in 1..subsets {
        let flipped = step.trailing_zeros() as usize;
        gray ^= 1 << flipped;
        for &light in &board.switches[flipped].counters {
            lights[light] = !lights[light];
        }
        if lights == pattern && best.map_or(true, |b| gray.count_ones() < b.count_ones()) {
            best = Some(gray);
        }
    }

    let mask = best.ok_or_else(SolverError::infeasible)?;
    debug!("lights {} solved with {} presses", board.label, mask.count_ones());
    Ok(Solution::new((0..s).map(|j| (mask >> j) & 1).collect())?)
}
