use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::{Error, Result},
    memory::{Exp, ExpBatch, ReplayMemory},
};

use super::{Frame, Simulator, State};

/// Configuration for the [`AtariWrapper`]
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperConfig {
    /// Number of consecutive frames stacked into one state
    pub observations_per_state: usize,
    /// Maximum number of experiences kept in replay memory
    pub replay_memory_capacity: usize,
    /// End an episode after this many steps even if the simulator has not
    pub max_episode_steps: Option<usize>,
    /// Seed for random actions and replay sampling, drawn from entropy if `None`
    pub seed: Option<u64>,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            observations_per_state: 4,
            replay_memory_capacity: 24000,
            max_episode_steps: None,
            seed: None,
        }
    }
}

/// A game-agnostic view over a raw [`Simulator`]
///
/// Exposes a fixed action space, stacks the most recent frames into a [`State`], and records
/// every transition into a [`ReplayMemory`].
///
/// The action space is an ordered list of raw simulator actions. Index positions in it are
/// the output units of the value function.
pub struct AtariWrapper<S: Simulator> {
    sim: S,
    actions: Vec<S::Action>,
    observations_per_state: usize,
    max_episode_steps: Option<usize>,
    state: State,
    memory: ReplayMemory,
    done: bool,
    episode_steps: usize,
    rng: StdRng,
}

impl<S: Simulator> AtariWrapper<S> {
    /// Wrap `sim`, restricting it to `actions`, and start the first episode
    ///
    /// **Panics** if `actions` is empty, or if `observations_per_state` or
    /// `replay_memory_capacity` is zero
    pub fn new(mut sim: S, actions: Vec<S::Action>, config: WrapperConfig) -> Self {
        assert!(!actions.is_empty(), "The action space must not be empty.");
        assert!(
            config.observations_per_state > 0,
            "A state must stack at least one observation."
        );

        sim.reset();
        let state = State::seeded(Frame::from(sim.observe()), config.observations_per_state);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            sim,
            actions,
            observations_per_state: config.observations_per_state,
            max_episode_steps: config.max_episode_steps,
            state,
            memory: ReplayMemory::new(config.replay_memory_capacity),
            done: false,
            episode_steps: 0,
            rng,
        }
    }

    /// Reset the simulator to a fresh episode and seed the state from its first frame
    pub fn restart(&mut self) {
        self.sim.reset();
        self.state = State::seeded(Frame::from(self.sim.observe()), self.observations_per_state);
        self.done = false;
        self.episode_steps = 0;
    }

    /// Apply `action` for one timestep and record the transition in replay memory
    ///
    /// ### Returns
    /// The reward for the transition
    ///
    /// ### Errors
    /// - [`Error::InvalidAction`] if `action` is not in the action space
    /// - [`Error::EpisodeFinished`] if the episode has already ended
    pub fn step(&mut self, action: S::Action) -> Result<f32> {
        let action_ix = self
            .action_index(&action)
            .ok_or_else(|| Error::InvalidAction {
                action: format!("{action:?}"),
            })?;
        if self.done {
            return Err(Error::EpisodeFinished);
        }

        let reward = self.sim.act(&action);
        self.episode_steps += 1;

        let state = self.state.clone();
        self.state.push(Frame::from(self.sim.observe()));

        let truncated = self
            .max_episode_steps
            .is_some_and(|max| self.episode_steps >= max);
        self.done = self.sim.is_terminal() || truncated;
        if truncated {
            debug!("episode truncated after {} steps", self.episode_steps);
        }

        self.memory.push(Exp {
            state,
            action: action_ix,
            reward,
            next_state: self.state.clone(),
            done: self.done,
        });

        Ok(reward)
    }

    /// The current stacked state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// A uniformly random action from the action space
    pub fn random_action(&mut self) -> S::Action {
        let ix = self.rng.gen_range(0..self.actions.len());
        self.actions[ix].clone()
    }

    /// Draw `batch_size` experiences with replacement, zipped into parallel arrays
    ///
    /// ### Errors
    /// [`Error::InsufficientExperiences`] if replay memory holds fewer than `batch_size` experiences
    pub fn sample_experiences(&mut self, batch_size: usize) -> Result<ExpBatch> {
        self.memory.sample_zipped(batch_size, &mut self.rng)
    }

    pub fn render(&mut self) {
        self.sim.render();
    }

    /// Whether the current episode has reached a terminal transition
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn actions(&self) -> &[S::Action] {
        &self.actions
    }

    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }

    /// Position of `action` in the action space
    pub fn action_index(&self, action: &S::Action) -> Option<usize> {
        self.actions.iter().position(|a| a == action)
    }

    pub fn observations_per_state(&self) -> usize {
        self.observations_per_state
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn simulator(&self) -> &S {
        &self.sim
    }
}
