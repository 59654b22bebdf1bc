use thiserror::Error;

/// Errors raised while turning one input line into a switchboard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The leading `[label]` is missing or unbalanced
    #[error("malformed label bracket in `{0}`")]
    Bracket(String),

    /// A parenthesised switch group could not be read
    #[error("malformed switch token `{0}`")]
    SwitchToken(String),

    /// The trailing `{...}` target list could not be read
    #[error("malformed target list `{0}`")]
    TargetList(String),

    /// The target list is present but holds no values
    #[error("target list is empty")]
    EmptyTargets,

    /// A switch refers to a counter the switchboard does not have
    #[error("switch {switch} references counter {counter}, but only {counters} counters exist")]
    IndexOutOfRange {
        switch: usize,
        counter: usize,
        counters: usize,
    },

    /// The label is not made of `.` and `#` only
    #[error("label `{0}` is not an indicator light pattern")]
    LightPattern(String),
}

/// Errors raised by the integer program solvers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// No non-negative integer vector satisfies the equalities.
    ///
    /// `counters` lists the counters whose equalities combine into a
    /// contradiction, when one could be isolated.
    #[error("{}", infeasible_message(counters))]
    Infeasible { counters: Vec<usize> },

    /// The search budget ran out before optimality or infeasibility was proven
    #[error("search budget of {limit} exhausted after {explored} steps")]
    ResourceExhausted { limit: u64, explored: u64 },

    /// The minimum exists but its press total does not fit in a `u64`
    #[error("minimum press total exceeds {}", u64::MAX)]
    Overflow,
}

fn infeasible_message(counters: &[usize]) -> String {
    if counters.is_empty() {
        "no solution".to_string()
    } else {
        let list: Vec<String> = counters.iter().map(|c| c.to_string()).collect();
        format!("no solution: equalities for counters {} are unsatisfiable", list.join(","))
    }
}

impl SolverError {
    pub fn infeasible() -> Self {
        SolverError::Infeasible { counters: Vec::new() }
    }

    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::Infeasible { .. } => "SOLVER_INFEASIBLE",
            SolverError::ResourceExhausted { .. } => "SOLVER_RESOURCE_EXHAUSTED",
            SolverError::Overflow => "SOLVER_OVERFLOW",
        }
    }

    /// Whether retrying with a larger budget could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SolverError::ResourceExhausted { .. })
    }
}

/// Top level error carrying the location of the offending switchboard
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error("line {line} (switchboard {index}): {source}")]
    Solve {
        line: usize,
        index: usize,
        #[source]
        source: SolverError,
    },

    /// Every switchboard solved, but the sum of the minima does not fit in a `u64`
    #[error("line {line}: total presses exceed {}", u64::MAX)]
    TotalOverflow { line: usize },
}

impl RunError {
    /// Physical line of the input that caused the failure, if known
    pub fn line(&self) -> Option<usize> {
        match self {
            RunError::Io { .. } => None,
            RunError::Format { line, .. }
            | RunError::Solve { line, .. }
            | RunError::TotalOverflow { line } => Some(*line),
        }
    }
}
