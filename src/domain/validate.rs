use crate::error::{FormatError, SolverError};
use crate::models::{IntegerProgram, Solution, Switchboard};

/// Every switch must reference counters the switchboard actually has.
pub fn validate_switchboard(board: &Switchboard) -> Result<(), FormatError> {
    if board.targets.is_empty() {
        return Err(FormatError::EmptyTargets);
    }
    validate_indices(board, board.num_counters())
}

/// Check switch indices against an explicit counter count.
pub fn validate_indices(board: &Switchboard, counters: usize) -> Result<(), FormatError> {
    for (switch_idx, switch) in board.switches.iter().enumerate() {
        if let Some(&counter) = switch.counters.iter().find(|&&c| c >= counters) {
            return Err(FormatError::IndexOutOfRange {
                switch: switch_idx,
                counter,
                counters,
            });
        }
    }
    Ok(())
}

/// Settle the cases that need no search.
///
/// Returns `None` when the program has to go to a solver.
pub fn trivial_solution(program: &IntegerProgram) -> Option<Result<Solution, SolverError>> {
    let s = program.num_switches();

    if program.targets.iter().all(|&t| t == 0) {
        return Some(Solution::new(vec![0; s]));
    }

    let unreachable: Vec<usize> = (0..program.num_counters())
        .filter(|&i| program.targets[i] > 0 && program.switches_for(i).next().is_none())
        .collect();
    if !unreachable.is_empty() {
        return Some(Err(SolverError::Infeasible {
            counters: unreachable,
        }));
    }

    None
}

/// Whether `solution` meets every equality and reports the right objective.
pub fn is_valid_solution(program: &IntegerProgram, solution: &Solution) -> bool {
    program.is_satisfied_by(&solution.presses)
        && Solution::new(solution.presses.clone()).map(|s| s.total) == Ok(solution.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::to_integer_program;
    use crate::models::Switch;
    use crate::parse::parse_line;

    fn program(line: &str) -> IntegerProgram {
        to_integer_program(&parse_line(line).unwrap())
    }

    #[test]
    fn test_validate_switchboard_given_valid_indices_should_return_ok() {
        let board = parse_line("[x] (0,1) (1) {1,2}").unwrap();
        assert!(validate_switchboard(&board).is_ok());
    }

    #[test]
    fn test_validate_switchboard_given_missing_counter_should_return_error() {
        let board = Switchboard {
            label: String::new(),
            switches: vec![Switch::new([0]), Switch::new([1, 4])],
            targets: vec![1, 1],
        };
        assert_eq!(
            validate_switchboard(&board),
            Err(FormatError::IndexOutOfRange {
                switch: 1,
                counter: 4,
                counters: 2
            })
        );
    }

    #[test]
    fn test_trivial_solution_given_zero_targets_returns_zero_presses() {
        let solution = trivial_solution(&program("[x] (0,1) (1) {0,0}")).unwrap().unwrap();
        assert_eq!(solution, Solution::new(vec![0, 0]).unwrap());
    }

    #[test]
    fn test_trivial_solution_given_no_switches() {
        let zero = trivial_solution(&program("[x] {0,0,0}")).unwrap().unwrap();
        assert_eq!(zero.total, 0);

        let error = trivial_solution(&program("[x] {0,3,0}")).unwrap().unwrap_err();
        assert_eq!(error, SolverError::Infeasible { counters: vec![1] });
    }

    #[test]
    fn test_trivial_solution_given_no_counters() {
        let empty = IntegerProgram {
            incidence: vec![vec![], vec![]],
            targets: vec![],
        };
        assert_eq!(trivial_solution(&empty), Some(Solution::new(vec![0, 0])));
    }

    #[test]
    fn test_trivial_solution_defers_real_work() {
        assert!(trivial_solution(&program("[x] (0) {3}")).is_none());
    }

    #[test]
    fn test_is_valid_solution() {
        let program = program("[2] (0) (1) (2) {3,4,5}");
        assert!(is_valid_solution(&program, &Solution::new(vec![3, 4, 5]).unwrap()));
        assert!(!is_valid_solution(&program, &Solution::new(vec![3, 4, 4]).unwrap()));
        let lying = Solution {
            presses: vec![3, 4, 5],
            total: 11,
        };
        assert!(!is_valid_solution(&program, &lying));
    }
}
