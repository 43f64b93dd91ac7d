use miette::*;

use crate::batch;
use crate::config::SolveConfig;
use crate::error::SolveError;
use crate::joltage;
use crate::machine::Machine;
use crate::parser;

/// Fewest presses to meet every machine's joltage requirements, summed.
pub fn solve(machines: &[Machine], config: &SolveConfig) -> Result<u64, SolveError> {
    let program = config.backend.program();
    batch::sum_over(machines, config.progress, |index, machine| {
        joltage::min_joltage_presses(machine, program).map_err(|source| SolveError::Infeasible {
            machine: index,
            source,
        })
    })
}

#[tracing::instrument]
pub fn process(input: &str) -> Result<String> {
    process_with(input, &SolveConfig::default())
}

#[tracing::instrument(skip(input))]
pub fn process_with(input: &str, config: &SolveConfig) -> Result<String> {
    let machines = parser::parse(input)?;
    let total = solve(&machines, config)?;

    Ok(total.to_string())
}
