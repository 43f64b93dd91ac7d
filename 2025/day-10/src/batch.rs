use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::ops::Add;

use crate::error::SolveError;
use crate::machine::Machine;

/// Solves every machine on the rayon pool and adds up the answers.
///
/// `solve` receives the 1-based position of the machine in the batch. Any
/// failure aborts the whole batch; when several machines fail, which one is
/// reported depends on scheduling.
pub fn sum_over<T, F>(machines: &[Machine], progress: bool, solve: F) -> Result<T, SolveError>
where
    T: Send + Default + Add<Output = T>,
    F: Fn(usize, &Machine) -> Result<T, SolveError> + Sync + Send,
{
    let bar = if progress {
        ProgressBar::new(machines.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let total = machines
        .par_iter()
        .enumerate()
        .progress_with(bar.clone())
        .map(|(index, machine)| solve(index + 1, machine))
        .try_reduce(T::default, |a, b| Ok(a + b));

    bar.finish_and_clear();
    total
}
