use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::SolverError;

// ---------- Domain types ----------

/// One toggle switch: the set of counters it increments when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Switch {
    pub counters: BTreeSet<usize>,
}

impl Switch {
    pub fn new(counters: impl IntoIterator<Item = usize>) -> Self {
        Switch {
            counters: counters.into_iter().collect(),
        }
    }

    pub fn affects(&self, counter: usize) -> bool {
        self.counters.contains(&counter)
    }
}

/// One independent puzzle instance.
///
/// A switch's identifier is its position in `switches`; counter `i` must
/// reach `targets[i]` exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switchboard {
    pub label: String,
    pub switches: Vec<Switch>,
    pub targets: Vec<u64>,
}

impl Switchboard {
    pub fn num_counters(&self) -> usize {
        self.targets.len()
    }
}

/// A parsed switchboard together with the input line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub switchboard: Switchboard,
}

/// Press count per switch plus the objective value (their sum).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub presses: Vec<u64>,
    pub total: u64,
}

impl Solution {
    /// Fails with `Overflow` when the presses do not sum within `u64`.
    pub fn new(presses: Vec<u64>) -> Result<Self, SolverError> {
        let total = presses
            .iter()
            .try_fold(0u64, |acc, &x| acc.checked_add(x))
            .ok_or(SolverError::Overflow)?;
        Ok(Solution { presses, total })
    }
}

/// `minimize sum(x) subject to A^T x = b, x >= 0, x integer`.
///
/// `incidence[j][i]` is 1 when switch `j` affects counter `i`; `targets` is `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerProgram {
    pub incidence: Vec<Vec<u8>>,
    pub targets: Vec<u64>,
}

impl IntegerProgram {
    pub fn num_switches(&self) -> usize {
        self.incidence.len()
    }

    pub fn num_counters(&self) -> usize {
        self.targets.len()
    }

    /// Switches affecting `counter`.
    pub fn switches_for(&self, counter: usize) -> impl Iterator<Item = usize> + '_ {
        self.incidence
            .iter()
            .enumerate()
            .filter(move |(_, row)| row[counter] != 0)
            .map(|(j, _)| j)
    }

    /// No switch needs more presses than the smallest target it feeds.
    ///
    /// A switch that feeds no counter never helps and is bounded by 0.
    pub fn upper_bounds(&self) -> Vec<u64> {
        self.incidence
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.targets)
                    .filter(|&(&a, _)| a != 0)
                    .map(|(_, &t)| t)
                    .min()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Counter values reached by pressing each switch `presses[j]` times,
    /// or `None` if a counter would pass `u64::MAX`.
    pub fn counters_after(&self, presses: &[u64]) -> Option<Vec<u64>> {
        let mut counters = vec![0u64; self.num_counters()];
        for (row, &count) in self.incidence.iter().zip(presses) {
            for (counter, &a) in counters.iter_mut().zip(row) {
                if a != 0 {
                    *counter = counter.checked_add(count)?;
                }
            }
        }
        Some(counters)
    }

    pub fn is_satisfied_by(&self, presses: &[u64]) -> bool {
        presses.len() == self.num_switches()
            && self.counters_after(presses).as_ref() == Some(&self.targets)
    }
}

/// What the presses must achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Counters must reach the `{...}` joltage targets exactly.
    #[default]
    Joltage,
    /// Toggled lights must match the `[.#]` label pattern.
    Lights,
}

impl Mode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "joltage" => Some(Mode::Joltage),
            "lights" => Some(Mode::Lights),
            _ => None,
        }
    }
}

// ---------- API (wire) types: owned & serde-friendly ----------

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiSwitchboard {
    pub switches: Vec<Vec<usize>>,
    pub targets: Vec<u64>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SolveRequest {
    /// Switchboards in the line-oriented text format
    #[serde(default)]
    pub input: Option<String>,
    /// Switchboards given structurally
    #[serde(default)]
    pub switchboards: Option<Vec<ApiSwitchboard>>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub solver: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiSolution {
    pub line: usize,
    pub presses: Vec<u64>,
    pub total: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SolveResponse {
    pub total: u64,
    pub solutions: Vec<ApiSolution>,
}
