use gym_rs::core::{ActionReward, Env};
use gym_rs::envs::classical_control::cartpole::{CartPoleEnv, CartPoleObservation};
use gym_rs::utils::renderer::RenderMode;
use strum::{EnumIter, FromRepr, VariantArray};

use crate::env::Simulator;

fn obs2arr(observation: CartPoleObservation) -> [f32; 4] {
    Vec::from(observation)
        .into_iter()
        .map(|x| x as f32)
        .collect::<Vec<_>>()
        .try_into()
        .expect("vec is length 4")
}

/// Actions for the [`CartPole`] simulator, representing applying a left or right force to the cart
#[derive(FromRepr, EnumIter, VariantArray, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CPAction {
    Left = 0,
    Right = 1,
}

/// The classic CartPole control task as a [`Simulator`]
///
/// This implementation is a thin wrapper around [gym_rs](https://github.com/MathisWellmann/gym-rs).
/// Each frame is the 4 dimensional observation of the cart and pole.
#[derive(Debug, Clone)]
pub struct CartPole {
    gym_env: CartPoleEnv,
    observation: [f32; 4],
    done: bool,
}

impl CartPole {
    pub fn new(render_mode: RenderMode) -> Self {
        Self {
            gym_env: CartPoleEnv::new(render_mode),
            observation: [0.0; 4],
            done: false,
        }
    }

    /// The full action space, in output unit order
    pub fn actions() -> Vec<CPAction> {
        CPAction::VARIANTS.to_vec()
    }
}

impl Simulator for CartPole {
    type Action = CPAction;

    fn reset(&mut self) {
        self.observation = obs2arr(self.gym_env.reset(None, false, None).0);
        self.done = false;
    }

    fn act(&mut self, action: &Self::Action) -> f32 {
        let ActionReward {
            observation,
            reward,
            done,
            ..
        } = self.gym_env.step(*action as usize);

        self.observation = obs2arr(observation);
        self.done = done;
        *reward as f32
    }

    fn observe(&self) -> Vec<f32> {
        self.observation.to_vec()
    }

    fn is_terminal(&self) -> bool {
        self.done
    }
}
