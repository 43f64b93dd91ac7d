use chumsky::prelude::*;
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

use crate::error::SolveError;
use crate::lights::LightState;
use crate::machine::Machine;

/// A machine line as written, before its wiring is checked against the lights.
struct RawMachine {
    target: LightState,
    buttons: Vec<Vec<usize>>,
    joltage: Vec<u32>,
}

fn number<'a, T>() -> impl Parser<'a, &'a str, T, extra::Err<Rich<'a, char>>> + Clone
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text::int(10).try_map(|digits: &str, span| {
        digits.parse::<T>().map_err(|e| Rich::custom(span, e))
    })
}

fn parser<'a>(
) -> impl Parser<'a, &'a str, Vec<(RawMachine, SimpleSpan)>, extra::Err<Rich<'a, char>>> {
    // Custom whitespace parser that excludes newlines
    let hspace = one_of(" \t").repeated();

    let light = choice((just('.').to(false), just('#').to(true)));

    // [.##.]
    let diagram = light
        .repeated()
        .collect::<Vec<bool>>()
        .map(|v| v.into_iter().collect::<LightState>())
        .delimited_by(just('['), just(']'));

    // (0,2,3)
    let button = number::<usize>()
        .separated_by(just(','))
        .collect::<Vec<usize>>()
        .delimited_by(just('('), just(')'));

    // (0,2) (1,3) ...
    let buttons = button.padded_by(hspace.clone()).repeated().collect::<Vec<_>>();

    // {3,5,4,7}
    let joltage = number::<u32>()
        .separated_by(just(','))
        .collect::<Vec<u32>>()
        .delimited_by(just('{'), just('}'));

    let machine = diagram
        .then_ignore(hspace.clone())
        .then(buttons)
        .then(joltage)
        .then_ignore(hspace)
        .map(|((target, buttons), joltage)| RawMachine {
            target,
            buttons,
            joltage,
        })
        .map_with(|raw, e| (raw, e.span()));

    machine
        .separated_by(text::newline())
        .allow_trailing()
        .collect()
}

/// Parses a whole batch, one machine per line.
#[tracing::instrument(skip_all, fields(bytes = input.len()))]
pub fn parse(input: &str) -> Result<Vec<Machine>, SolveError> {
    let raw = parser()
        .parse(input.trim_end())
        .into_result()
        .map_err(|errors| {
            let offset = errors.first().map_or(0, |e| e.span().start);
            let message = errors.iter().map(ToString::to_string).join("; ");
            SolveError::malformed(input, offset, message)
        })?;

    let machines = raw
        .into_iter()
        .map(|(raw, span)| {
            Machine::new(raw.target, raw.buttons, raw.joltage)
                .map_err(|e| SolveError::malformed(input, span.start, e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(machines = machines.len(), "parsed batch");
    Ok(machines)
}
