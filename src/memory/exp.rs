use crate::env::State;

/// Represents a single experience or transition in the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Exp {
    /// The state of the environment before taking the action
    pub state: State,
    /// Index of the action taken, into the environment's action space
    pub action: usize,
    /// The reward received after taking the action
    pub reward: f32,
    /// The state of the environment after the action is taken
    pub next_state: State,
    /// Whether the transition ended the episode
    pub done: bool,
}

/// A zipped batch of [experiences](Exp), one parallel array per field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpBatch {
    pub states: Vec<State>,
    pub actions: Vec<usize>,
    pub rewards: Vec<f32>,
    pub next_states: Vec<State>,
    pub dones: Vec<bool>,
}

impl ExpBatch {
    /// Construct an `ExpBatch` from an iterator of [experience](Exp) references and a specified batch size
    pub fn from_iter<'a>(iter: impl IntoIterator<Item = &'a Exp>, batch_size: usize) -> Self {
        let batch = Self {
            states: Vec::with_capacity(batch_size),
            actions: Vec::with_capacity(batch_size),
            rewards: Vec::with_capacity(batch_size),
            next_states: Vec::with_capacity(batch_size),
            dones: Vec::with_capacity(batch_size),
        };

        iter.into_iter().fold(batch, |mut b, e| {
            b.states.push(e.state.clone());
            b.actions.push(e.action);
            b.rewards.push(e.reward);
            b.next_states.push(e.next_state.clone());
            b.dones.push(e.done);
            b
        })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::tests::state_of;

    #[test]
    fn exp_batch_from_iter() {
        let experiences = [
            Exp {
                state: state_of(&[0.0]),
                action: 1,
                reward: 1.0,
                next_state: state_of(&[1.0]),
                done: false,
            },
            Exp {
                state: state_of(&[1.0]),
                action: 0,
                reward: -1.0,
                next_state: state_of(&[2.0]),
                done: true,
            },
        ];
        let batch = ExpBatch::from_iter(&experiences, 2);

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.states,
            [state_of(&[0.0]), state_of(&[1.0])],
            "states zipped correctly"
        );
        assert_eq!(batch.actions, [1, 0], "actions zipped correctly");
        assert_eq!(batch.rewards, [1.0, -1.0], "rewards zipped correctly");
        assert_eq!(
            batch.next_states,
            [state_of(&[1.0]), state_of(&[2.0])],
            "next states zipped correctly"
        );
        assert_eq!(batch.dones, [false, true], "terminal flags zipped correctly");
    }
}
