use crate::joltage::{BranchAndBound, ExactElimination, IntegerProgram, MilpSolver};

/// Caller-supplied cutoff for the activation search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of states expanded before giving up. `None` searches
    /// until the frontier runs dry.
    pub max_expansions: Option<usize>,
}

/// Which integer program backend answers the joltage question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Milp,
    Exact,
    BranchAndBound,
}

impl Backend {
    pub fn program(self) -> &'static dyn IntegerProgram {
        match self {
            Backend::Milp => &MilpSolver,
            Backend::Exact => &ExactElimination,
            Backend::BranchAndBound => &BranchAndBound,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveConfig {
    pub limits: SearchLimits,
    pub backend: Backend,
    /// Draw a progress bar while the batch is being solved.
    pub progress: bool,
}

impl SolveConfig {
    pub fn with_progress(self) -> Self {
        Self {
            progress: true,
            ..self
        }
    }
}
