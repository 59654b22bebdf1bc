use std::fmt;
use std::str::FromStr;

use crate::domain::validate::validate_switchboard;
use crate::error::{FormatError, RunError};
use crate::models::{Record, Switch, Switchboard};

/// Parse one line of the form `[label] (0,1) (2) {3,4,5}`.
pub fn parse_line(line: &str) -> Result<Switchboard, FormatError> {
    let line = line.trim();

    let rest = line
        .strip_prefix('[')
        .ok_or_else(|| FormatError::Bracket(line.to_string()))?;
    let (label, rest) = rest
        .split_once(']')
        .ok_or_else(|| FormatError::Bracket(line.to_string()))?;
    if label.contains('[') {
        return Err(FormatError::Bracket(line.to_string()));
    }

    let (groups, targets) = rest
        .split_once('{')
        .ok_or_else(|| FormatError::TargetList(rest.trim().to_string()))?;
    let targets = parse_targets(targets)?;

    let switches = groups
        .split_whitespace()
        .map(parse_switch)
        .collect::<Result<Vec<_>, _>>()?;

    let board = Switchboard {
        label: label.to_string(),
        switches,
        targets,
    };
    validate_switchboard(&board)?;
    Ok(board)
}

fn parse_switch(token: &str) -> Result<Switch, FormatError> {
    let inner = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .filter(|t| !t.contains(['(', ')']))
        .ok_or_else(|| FormatError::SwitchToken(token.to_string()))?;

    // `()` is a switch wired to nothing
    if inner.trim().is_empty() {
        return Ok(Switch::default());
    }

    inner
        .split(',')
        .map(parse_number::<usize>)
        .collect::<Option<Switch>>()
        .ok_or_else(|| FormatError::SwitchToken(token.to_string()))
}

/// `tail` is everything after the opening brace.
fn parse_targets(tail: &str) -> Result<Vec<u64>, FormatError> {
    let malformed = || FormatError::TargetList(format!("{{{}", tail));

    let inner = tail.trim_end().strip_suffix('}').ok_or_else(malformed)?;
    if inner.contains(['{', '}']) {
        return Err(malformed());
    }
    if inner.trim().is_empty() {
        return Err(FormatError::EmptyTargets);
    }

    inner
        .split(',')
        .map(|t| parse_number::<u64>(t).ok_or_else(malformed))
        .collect()
}

/// Plain decimal digits: no sign, no empty field.
fn parse_number<T: FromStr>(text: &str) -> Option<T> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse a whole input file.
///
/// Blank lines are skipped; line numbers in errors are physical and 1-based.
pub fn parse_input(content: &str) -> Result<Vec<Record>, RunError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(idx, text)| {
            parse_line(text)
                .map(|switchboard| Record {
                    line: idx + 1,
                    switchboard,
                })
                .map_err(|source| RunError::Format {
                    line: idx + 1,
                    source,
                })
        })
        .collect()
}

/// Interpret the label as an indicator light pattern (`#` on, `.` off).
pub fn light_pattern(label: &str) -> Result<Vec<bool>, FormatError> {
    label
        .chars()
        .map(|c| match c {
            '#' => Ok(true),
            '.' => Ok(false),
            _ => Err(FormatError::LightPattern(label.to_string())),
        })
        .collect()
}

impl FromIterator<usize> for Switch {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Switch::new(iter)
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list: Vec<String> = self.counters.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", list.join(","))
    }
}

/// Canonical text form; parsing it yields an identical switchboard.
impl fmt::Display for Switchboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label)?;
        for switch in &self.switches {
            write!(f, " {}", switch)?;
        }
        let targets: Vec<String> = self.targets.iter().map(|t| t.to_string()).collect();
        write!(f, " {{{}}}", targets.join(","))
    }
}
