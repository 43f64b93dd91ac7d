use miette::*;

use aoc2025_day_10::config::SolveConfig;
use aoc2025_day_10::part2;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let input = include_str!("../../input2.txt");
    let result = part2::process_with(input, &SolveConfig::default().with_progress())?;
    println!("Result: {}", result);
    Ok(())
}
