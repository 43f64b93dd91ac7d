use miette::*;

use crate::batch;
use crate::config::SolveConfig;
use crate::error::SolveError;
use crate::machine::Machine;
use crate::parser;
use crate::search;

/// Fewest presses to show every machine's indicator pattern, summed.
pub fn solve(machines: &[Machine], config: &SolveConfig) -> Result<usize, SolveError> {
    batch::sum_over(machines, config.progress, |index, machine| {
        search::min_presses(machine, config.limits).map_err(|source| SolveError::Unreachable {
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
    let total_presses = solve(&machines, config)?;

    Ok(total_presses.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::SearchLimits;
    use crate::error::Unreachable;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";
        assert_eq!("7", process(input)?);
        Ok(())
    }

    #[test]
    fn empty_batch() -> Result<()> {
        assert_eq!("0", process("")?);
        Ok(())
    }

    #[test]
    fn unreachable_machine_aborts_batch() {
        let input = "[#.] (0) (1) {1,0}
[.#] (0) {0,1}";
        let report = process(input).unwrap_err();
        assert!(matches!(
            report.downcast_ref::<SolveError>(),
            Some(SolveError::Unreachable {
                machine: 2,
                source: Unreachable::Exhausted { .. },
            })
        ));
    }

    #[test]
    fn search_budget_flows_through_config() {
        let machines = parser::parse("[##] (0) (1) {0,0}").unwrap();
        let config = SolveConfig {
            limits: SearchLimits {
                max_expansions: Some(1),
            },
            ..SolveConfig::default()
        };
        assert!(matches!(
            solve(&machines, &config),
            Err(SolveError::Unreachable {
                machine: 1,
                source: Unreachable::BudgetExceeded { limit: 1 },
            })
        ));
    }
}
