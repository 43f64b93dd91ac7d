use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use crate::config::SearchLimits;
use crate::error::Unreachable;
use crate::lights::{LightState, ToggleCache};
use crate::machine::Machine;

/// Frontier entry. Ordered so that `BinaryHeap` pops the cheapest state first,
/// earliest pushed among equals. Equality follows the ordering, so the state
/// takes no part in it.
#[derive(Debug)]
struct Visit {
    presses: usize,
    seq: usize,
    state: LightState,
}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .presses
            .cmp(&self.presses)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fewest button presses that take the machine from all lights off to its
/// target pattern.
///
/// Uniform-cost search over light states where every press costs one. Stale
/// frontier entries are skipped on pop instead of being removed on update.
#[tracing::instrument(
    skip_all,
    fields(lights = machine.light_count(), buttons = machine.buttons().len())
)]
pub fn min_presses(machine: &Machine, limits: SearchLimits) -> Result<usize, Unreachable> {
    let target = machine.target();
    let start = LightState::off(machine.light_count());

    let mut cache = ToggleCache::new();
    let mut best: HashMap<LightState, usize> = HashMap::from([(start.clone(), 0)]);
    let mut frontier = BinaryHeap::from([Visit {
        presses: 0,
        seq: 0,
        state: start,
    }]);
    let mut seq = 1;
    let mut expansions = 0;

    while let Some(Visit { presses, state, .. }) = frontier.pop() {
        if &state == target {
            tracing::debug!(
                presses,
                explored = best.len(),
                cache_hits = cache.hits(),
                cache_misses = cache.misses(),
                "reached target"
            );
            return Ok(presses);
        }

        if best.get(&state).is_some_and(|&known| presses > known) {
            continue;
        }

        if let Some(limit) = limits.max_expansions {
            if expansions >= limit {
                tracing::debug!(limit, explored = best.len(), "search budget exceeded");
                return Err(Unreachable::BudgetExceeded { limit });
            }
        }
        expansions += 1;

        let next_presses = presses + 1;
        for (id, button) in machine.buttons().iter().enumerate() {
            let next = cache.apply(&state, id, button);
            let improved = match best.entry(next.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(next_presses);
                    true
                }
                Entry::Occupied(mut entry) if next_presses < *entry.get() => {
                    entry.insert(next_presses);
                    true
                }
                Entry::Occupied(_) => false,
            };

            if improved {
                frontier.push(Visit {
                    presses: next_presses,
                    seq,
                    state: next,
                });
                seq += 1;
            }
        }
    }

    tracing::debug!(explored = best.len(), "frontier exhausted");
    Err(Unreachable::Exhausted {
        explored: best.len(),
    })
}
