pub mod batch;
pub mod config;
pub mod error;
pub mod joltage;
pub mod lights;
pub mod machine;
pub mod parser;
pub mod part1;
pub mod part2;
pub mod search;
