use miette::Diagnostic;
use thiserror::Error;

/// Why a machine description is rejected after it parsed syntactically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("button {button} toggles light {light}, but the machine only has {lights} lights")]
    ButtonOutOfRange {
        button: usize,
        light: usize,
        lights: usize,
    },
    #[error("expected {expected} joltage requirements (one per light), found {found}")]
    JoltageLength { expected: usize, found: usize },
    #[error("unknown light symbol {0:?}, expected '.' or '#'")]
    UnknownLight(char),
}

/// The activation search gave up without reaching the target lights.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unreachable {
    #[error("no combination of presses produces the target lights ({explored} states explored)")]
    Exhausted { explored: usize },
    #[error("search budget of {limit} expansions exceeded before reaching the target lights")]
    BudgetExceeded { limit: usize },
}

/// No non-negative integer press counts match the joltage requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("joltage requirements cannot be met with non-negative integer presses")]
pub struct Infeasible;

#[derive(Debug, Error, Diagnostic)]
pub enum SolveError {
    #[error("malformed input on line {line}: {message}")]
    #[diagnostic(
        code(day10::malformed_input),
        help("a machine line is a light pattern, its buttons, then one joltage per light")
    )]
    MalformedInput { line: usize, message: String },

    #[error("machine #{machine} cannot reach its target lights")]
    #[diagnostic(code(day10::unreachable))]
    Unreachable {
        machine: usize,
        #[source]
        source: Unreachable,
    },

    #[error("machine #{machine} cannot meet its joltage requirements")]
    #[diagnostic(
        code(day10::infeasible),
        help("every light with a nonzero requirement needs at least one button wired to it")
    )]
    Infeasible {
        machine: usize,
        #[source]
        source: Infeasible,
    },
}

impl SolveError {
    /// Locates a parse failure by its byte offset into the batch.
    pub(crate) fn malformed(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(input.len());
        let line = input.as_bytes()[..offset]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        SolveError::MalformedInput {
            line,
            message: message.into(),
        }
    }
}
