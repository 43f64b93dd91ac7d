use crate::error::MachineError;
use crate::lights::{Button, LightState};

/// One line of the manual: indicator target, buttons and joltage requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    target: LightState,
    buttons: Vec<Button>,
    joltage: Vec<u32>,
}

impl Machine {
    /// Builds a machine, checking that every button index and the joltage
    /// vector fit the number of lights in `target`.
    pub fn new(
        target: LightState,
        buttons: Vec<Vec<usize>>,
        joltage: Vec<u32>,
    ) -> Result<Self, MachineError> {
        let lights = target.len();

        if joltage.len() != lights {
            return Err(MachineError::JoltageLength {
                expected: lights,
                found: joltage.len(),
            });
        }

        for (button, wiring) in buttons.iter().enumerate() {
            if let Some(&light) = wiring.iter().find(|&&light| light >= lights) {
                return Err(MachineError::ButtonOutOfRange {
                    button,
                    light,
                    lights,
                });
            }
        }

        let buttons = buttons
            .into_iter()
            .map(|wiring| Button::wired(wiring, lights))
            .collect();

        Ok(Self {
            target,
            buttons,
            joltage,
        })
    }

    pub fn light_count(&self) -> usize {
        self.target.len()
    }

    pub fn target(&self) -> &LightState {
        &self.target
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn joltage(&self) -> &[u32] {
        &self.joltage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn builds_valid_machine() {
        let machine = Machine::new(
            ".##.".parse().unwrap(),
            vec![vec![3], vec![1, 3], vec![2]],
            vec![3, 5, 4, 7],
        )
        .unwrap();

        assert_eq!(machine.light_count(), 4);
        assert_eq!(machine.buttons().len(), 3);
        assert_eq!(machine.buttons()[1].lights(), &[1, 3]);
        assert_eq!(machine.joltage(), &[3, 5, 4, 7]);
    }

    #[rstest]
    #[case(vec![vec![0], vec![1, 4]], vec![1, 1, 1, 1], MachineError::ButtonOutOfRange { button: 1, light: 4, lights: 4 })]
    #[case(vec![vec![0]], vec![1, 1, 1], MachineError::JoltageLength { expected: 4, found: 3 })]
    #[case(vec![], vec![1, 1, 1, 1, 1], MachineError::JoltageLength { expected: 4, found: 5 })]
    fn rejects_inconsistent_machines(
        #[case] buttons: Vec<Vec<usize>>,
        #[case] joltage: Vec<u32>,
        #[case] expected: MachineError,
    ) {
        let result = Machine::new(LightState::off(4), buttons, joltage);
        assert_eq!(result, Err(expected));
    }
}
