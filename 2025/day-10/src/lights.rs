use bitvec::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::MachineError;

/// A bit vector backed by `usize` words with Least Significant Bit first ordering.
type Row = BitVec<usize, Lsb0>;

/// On/off state of every light on a machine.
///
/// States are search-graph nodes and cache keys, so equality and hashing are
/// structural. Pressing a button never mutates a state, it derives a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LightState(Row);

impl LightState {
    /// All `len` lights switched off.
    pub fn off(len: usize) -> Self {
        Self(Row::repeat(false, len))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_lit(&self, light: usize) -> bool {
        self.0.get(light).is_some_and(|bit| *bit)
    }

    pub fn is_all_off(&self) -> bool {
        self.0.not_any()
    }

    /// Presses `button` once: every light it is wired to flips.
    pub fn apply(&self, button: &Button) -> Self {
        debug_assert_eq!(self.len(), button.mask.len());
        let mut next = self.0.clone();
        next ^= &button.mask;
        Self(next)
    }
}

impl FromIterator<bool> for LightState {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for LightState {
    type Err = MachineError;

    /// Parses an indicator pattern such as `.##.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '.' => Ok(false),
                '#' => Ok(true),
                other => Err(MachineError::UnknownLight(other)),
            })
            .collect()
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0.iter() {
            f.write_str(if *bit { "#" } else { "." })?;
        }
        Ok(())
    }
}

/// A button and the lights it is wired to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Button {
    /// Indices exactly as listed in the input, duplicates included.
    lights: Vec<usize>,
    /// Net effect of one press. A light listed twice flips twice and cancels out.
    mask: Row,
}

impl Button {
    /// Wires a button to `lights` on a machine with `light_count` lights.
    ///
    /// Every index must be below `light_count`; [`crate::machine::Machine::new`]
    /// checks this before building its buttons.
    pub(crate) fn wired(lights: Vec<usize>, light_count: usize) -> Self {
        let mut mask = Row::repeat(false, light_count);
        for &light in &lights {
            let lit = mask[light];
            mask.set(light, !lit);
        }
        Self { lights, mask }
    }

    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    /// Whether pressing this button feeds `light` at all.
    pub fn affects(&self, light: usize) -> bool {
        self.lights.contains(&light)
    }
}

/// Memoized [`LightState::apply`] for a single search.
///
/// Keys are `(state, button index)`, so one cache must only ever see the
/// buttons of one machine. Entries are never invalidated.
#[derive(Debug, Default)]
pub struct ToggleCache {
    table: HashMap<LightState, Vec<Option<LightState>>>,
    hits: usize,
    misses: usize,
}

impl ToggleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, state: &LightState, id: usize, button: &Button) -> LightState {
        if let Some(Some(next)) = self.table.get(state).and_then(|row| row.get(id)) {
            self.hits += 1;
            return next.clone();
        }

        self.misses += 1;
        let next = state.apply(button);
        let row = self.table.entry(state.clone()).or_default();
        if row.len() <= id {
            row.resize(id + 1, None);
        }
        row[id] = Some(next.clone());
        next
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn state(pattern: &str) -> LightState {
        pattern.parse().unwrap()
    }

    #[rstest]
    #[case(".....", vec![0, 2])]
    #[case("#.#.#", vec![0, 2])]
    #[case("##..#", vec![1, 3, 4])]
    #[case("#####", vec![])]
    #[case(".#..#", vec![0, 1, 2, 3, 4])]
    fn pressing_twice_restores_the_state(#[case] pattern: &str, #[case] lights: Vec<usize>) {
        let s = state(pattern);
        let button = Button::wired(lights, s.len());
        assert_eq!(s.apply(&button).apply(&button), s);
    }

    #[rstest]
    #[case(".##.", vec![3], ".###")]
    #[case(".##.", vec![1, 3], "..##")]
    #[case("....", vec![0, 2], "#.#.")]
    #[case("#..#", vec![], "#..#")]
    fn apply_flips_only_wired_lights(
        #[case] pattern: &str,
        #[case] lights: Vec<usize>,
        #[case] expected: &str,
    ) {
        let button = Button::wired(lights, pattern.len());
        assert_eq!(state(pattern).apply(&button), state(expected));
    }

    #[test]
    fn disjoint_buttons_commute() {
        let s = state("#..#.#");
        let a = Button::wired(vec![0, 1], 6);
        let b = Button::wired(vec![3, 5], 6);
        assert_eq!(s.apply(&a).apply(&b), s.apply(&b).apply(&a));
    }

    #[test]
    fn overlapping_buttons_compose_through_apply() {
        let a = Button::wired(vec![0, 1], 3);
        let b = Button::wired(vec![1, 2], 3);
        let s = LightState::off(3).apply(&a).apply(&b);
        // Light 1 is flipped by both presses.
        assert_eq!(s, state("#.#"));
    }

    #[test]
    fn duplicated_index_cancels_out() {
        let button = Button::wired(vec![0, 1, 1], 3);
        assert_eq!(LightState::off(3).apply(&button), state("#.."));
        assert_eq!(button.lights(), &[0, 1, 1]);
        assert!(button.affects(1));
        assert!(!button.affects(2));
    }

    #[test]
    fn pattern_round_trips_through_display() {
        let s = state(".###.#");
        assert_eq!(s.to_string(), ".###.#");
        assert!(s.is_lit(1));
        assert!(!s.is_lit(0));
        assert!(!s.is_lit(42));
        assert!(LightState::off(4).is_all_off());
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        assert_eq!(
            "..x.".parse::<LightState>(),
            Err(MachineError::UnknownLight('x'))
        );
    }

    #[test]
    fn cache_matches_plain_apply() {
        let buttons = [Button::wired(vec![0], 3), Button::wired(vec![1, 2], 3)];
        let mut cache = ToggleCache::new();
        let start = LightState::off(3);

        for (id, button) in buttons.iter().enumerate() {
            assert_eq!(cache.apply(&start, id, button), start.apply(button));
        }
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);

        assert_eq!(cache.apply(&start, 1, &buttons[1]), state(".##"));
        assert_eq!(cache.hits(), 1);
    }
}
