use crate::domain::validate::validate_switchboard;
use crate::error::FormatError;
use crate::models::{ApiSwitchboard, IntegerProgram, Switch, Switchboard};

/// Build the linear system for a switchboard: one equality per counter,
/// one non-negative integer variable per switch.
pub fn to_integer_program(board: &Switchboard) -> IntegerProgram {
    let n = board.num_counters();
    let incidence = board
        .switches
        .iter()
        .map(|switch| {
            let mut row = vec![0u8; n];
            for &counter in &switch.counters {
                row[counter] = 1;
            }
            row
        })
        .collect();

    IntegerProgram {
        incidence,
        targets: board.targets.clone(),
    }
}

/// Convert a structured API switchboard, applying the same checks as the text parser.
pub fn to_switchboard(api: &ApiSwitchboard) -> Result<Switchboard, FormatError> {
    let board = Switchboard {
        label: api.label.clone().unwrap_or_default(),
        switches: api
            .switches
            .iter()
            .map(|counters| Switch::new(counters.iter().copied()))
            .collect(),
        targets: api.targets.clone(),
    };
    validate_switchboard(&board)?;
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    #[test]
    fn test_to_integer_program_builds_incidence() {
        let board = parse_line("[1] (0,1) (1,2) {2,2,1}").unwrap();
        let program = to_integer_program(&board);
        assert_eq!(program.incidence, vec![vec![1, 1, 0], vec![0, 1, 1]]);
        assert_eq!(program.targets, vec![2, 2, 1]);
        assert_eq!(program.num_switches(), 2);
        assert_eq!(program.num_counters(), 3);
    }

    #[test]
    fn test_upper_bounds_use_smallest_fed_target() {
        let board = parse_line("[x] (0,1) (2) () {7,3,9}").unwrap();
        let program = to_integer_program(&board);
        assert_eq!(program.upper_bounds(), vec![3, 9, 0]);
    }

    #[test]
    fn test_counters_after_presses() {
        let board = parse_line("[x] (0,1) (1,2) {0,0,0}").unwrap();
        let program = to_integer_program(&board);
        assert_eq!(program.counters_after(&[2, 1]), Some(vec![2, 3, 1]));
        assert!(!program.is_satisfied_by(&[2, 1]));
        assert!(!program.is_satisfied_by(&[0]));
        assert!(program.is_satisfied_by(&[0, 0]));
    }

    #[test]
    fn test_to_switchboard_given_valid_input_should_return_ok() {
        let api = ApiSwitchboard {
            switches: vec![vec![0], vec![1, 1]],
            targets: vec![3, 4],
            label: None,
        };
        let board = to_switchboard(&api).unwrap();
        assert_eq!(board.to_string(), "[] (0) (1) {3,4}");
    }

    #[test]
    fn test_to_switchboard_given_bad_index_should_return_error() {
        let api = ApiSwitchboard {
            switches: vec![vec![0, 5]],
            targets: vec![3, 4],
            label: None,
        };
        assert!(matches!(
            to_switchboard(&api),
            Err(FormatError::IndexOutOfRange { counter: 5, .. })
        ));
    }

    #[test]
    fn test_to_switchboard_given_no_targets_should_return_error() {
        let api = ApiSwitchboard {
            switches: vec![],
            targets: vec![],
            label: None,
        };
        assert_eq!(to_switchboard(&api), Err(FormatError::EmptyTargets));
    }
}
