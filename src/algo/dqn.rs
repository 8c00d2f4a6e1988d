use std::path::PathBuf;

use burn::{prelude::*, tensor::ElementConversion};
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    assert_interval,
    decay::Anneal,
    env::{AtariWrapper, Simulator},
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    traits::ToTensor,
};

use super::ValueFunction;

/// Configuration for the [`Agent`]
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Exploration chance of the first episode
    pub start_epsilon: f32,
    /// Exploration chance once annealing is over
    pub end_epsilon: f32,
    /// Number of episodes over which epsilon goes from `start_epsilon` to `end_epsilon`
    pub anneal_duration: u32,
    /// Number of timesteps to accumulate experiences before training starts
    pub wait_before_training: u64,
    /// Number of timesteps between training updates
    pub train_interval: u64,
    /// Number of experiences sampled per training update
    pub batch_size: usize,
    /// The discount factor
    pub discount: f32,
    /// Number of timesteps between checkpoints, when a checkpoint path is set
    pub save_interval: u64,
    /// Seed for exploration draws, drawn from entropy if `None`
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            start_epsilon: 1.0,
            end_epsilon: 0.0,
            anneal_duration: 500,
            wait_before_training: 5000,
            train_interval: 100,
            batch_size: 1024,
            discount: 0.99,
            save_interval: 30000,
            seed: None,
        }
    }
}

/// Compute the temporal difference targets of a batch of transitions
///
/// target = reward + (1 - done) * discount * max<sub>a</sub> Q(next_state, a)
///
/// `dones` is a `0.0`/`1.0` mask, so terminal transitions keep only their reward.
pub fn td_targets<B: Backend>(
    rewards: Tensor<B, 1>,
    dones: Tensor<B, 1>,
    max_next_values: Tensor<B, 1>,
    discount: f32,
) -> Tensor<B, 1> {
    let continuing = dones.neg().add_scalar(1.0);
    rewards + continuing * max_next_values.mul_scalar(discount)
}

/// A deep Q-learning agent
///
/// Plays episodes in an [`AtariWrapper`], exploring epsilon-greedily with epsilon annealed
/// per episode, and every `train_interval` timesteps (once `wait_before_training` timesteps
/// have passed) fits its [`ValueFunction`] to the TD targets of a batch sampled from replay memory.
///
/// ### Generics
/// - `B`: The burn backend of the value function
/// - `S`: The [`Simulator`] being played
/// - `Q`: The [`ValueFunction`]
pub struct Agent<B, S, Q>
where
    B: Backend,
    S: Simulator,
    Q: ValueFunction<B>,
{
    env: AtariWrapper<S>,
    value_fn: Q,
    device: B::Device,
    exploration: EpsilonGreedy<Anneal>,
    wait_before_training: u64,
    train_interval: u64,
    batch_size: usize,
    discount: f32,
    save_interval: u64,
    save_path: Option<PathBuf>,
    rng: StdRng,
    epsilon: f32,
    t: u64,
    episodes_played: u32,
}

impl<B, S, Q> Agent<B, S, Q>
where
    B: Backend,
    S: Simulator,
    Q: ValueFunction<B>,
{
    /// Initialize a new `Agent`
    ///
    /// **Panics** if `discount` is not in the interval `[0,1]`, or if `train_interval` or
    /// `batch_size` is zero
    pub fn new(env: AtariWrapper<S>, value_fn: Q, config: AgentConfig, device: B::Device) -> Self {
        let AgentConfig {
            start_epsilon,
            end_epsilon,
            anneal_duration,
            wait_before_training,
            train_interval,
            batch_size,
            discount,
            save_interval,
            seed,
        } = config;
        assert_interval!(discount, 0.0, 1.0);
        assert!(train_interval > 0, "`train_interval` must be greater than zero.");
        assert!(batch_size > 0, "`batch_size` must be greater than zero.");

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            env,
            value_fn,
            device,
            exploration: EpsilonGreedy::new(Anneal::new(start_epsilon, end_epsilon, anneal_duration)),
            wait_before_training,
            train_interval,
            batch_size,
            discount,
            save_interval,
            save_path: None,
            rng,
            epsilon: start_epsilon,
            t: 0,
            episodes_played: 0,
        }
    }

    /// Save the value function to `path` every `save_interval` timesteps while training
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    /// Play one training episode
    ///
    /// **Returns** the total reward of the episode
    pub fn train(&mut self, render: bool, learning_rate: f64) -> Result<f32> {
        if self.env.is_done() {
            self.env.restart();
        }

        let episode = self.episodes_played;
        self.episodes_played += 1;
        let epsilon = self.exploration.epsilon(episode);
        self.epsilon = epsilon;
        let mut episode_reward = 0.0;

        while !self.env.is_done() {
            self.t += 1;

            if render {
                self.env.render();
            }

            if self.t > self.wait_before_training && self.t % self.train_interval == 0 {
                self.learn(learning_rate)?;
            }

            let action = match self.exploration.choose_at(epsilon, &mut self.rng) {
                Choice::Explore => self.env.random_action(),
                Choice::Exploit => self.greedy_action()?,
            };
            episode_reward += self.env.step(action)?;

            self.checkpoint()?;
        }

        info!(
            "Episode: {}  Reward: {}  Epsilon: {}",
            self.episodes_played, episode_reward, epsilon
        );
        Ok(episode_reward)
    }

    /// Play one evaluation episode, always taking the greedy action and never training
    ///
    /// **Returns** the total reward of the episode
    pub fn play(&mut self, render: bool) -> Result<f32> {
        if self.env.is_done() {
            self.env.restart();
        }

        let mut episode_reward = 0.0;
        while !self.env.is_done() {
            if render {
                self.env.render();
            }

            let action = self.greedy_action()?;
            episode_reward += self.env.step(action)?;
        }

        info!("Evaluation reward: {episode_reward}");
        Ok(episode_reward)
    }

    /// Save the value function to the checkpoint path, if one is set
    pub fn save(&self) -> Result<()> {
        if let Some(path) = &self.save_path {
            self.value_fn.save(path)?;
            info!("Saved model at {path:?} (t = {})", self.t);
        }
        Ok(())
    }

    fn checkpoint(&self) -> Result<()> {
        if self.save_interval > 0 && self.t % self.save_interval == 0 {
            self.save()?;
        }
        Ok(())
    }

    /// The action the value function rates highest in the current state
    fn greedy_action(&self) -> Result<S::Action> {
        let state = std::slice::from_ref(self.env.state()).to_tensor(&self.device);
        let ix = self
            .value_fn
            .optimal_action(state)
            .into_scalar()
            .elem::<i64>() as usize;

        self.env
            .actions()
            .get(ix)
            .cloned()
            .ok_or_else(|| Error::InvalidAction {
                action: format!("index {ix}"),
            })
    }

    /// Fit the value function to the TD targets of one sampled batch
    fn learn(&mut self, learning_rate: f64) -> Result<f32> {
        let batch = self.env.sample_experiences(self.batch_size)?;

        let states: Tensor<B, 3> = batch.states.as_slice().to_tensor(&self.device);
        let actions: Tensor<B, 1, Int> = batch.actions.as_slice().to_tensor(&self.device);
        let rewards: Tensor<B, 1> = batch.rewards.as_slice().to_tensor(&self.device);
        let next_states: Tensor<B, 3> = batch.next_states.as_slice().to_tensor(&self.device);
        let dones: Tensor<B, 1> = batch.dones.as_slice().to_tensor(&self.device);

        let max_next_values = self.value_fn.optimal_action_value(next_states);
        let targets = td_targets(rewards, dones, max_next_values, self.discount);

        let loss = self.value_fn.train(states, actions, targets, learning_rate);
        debug!("t = {}: trained on {} experiences, loss {loss}", self.t, self.batch_size);
        Ok(loss)
    }

    /// Timesteps played in training episodes
    pub fn t(&self) -> u64 {
        self.t
    }

    /// Training episodes started so far
    pub fn episodes_played(&self) -> u32 {
        self.episodes_played
    }

    /// Epsilon of the most recent training episode
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// The wrapped environment
    pub fn env(&self) -> &AtariWrapper<S> {
        &self.env
    }

    /// The value function being trained
    pub fn value_function(&self) -> &Q {
        &self.value_fn
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, path::Path};

    use burn::{
        backend::{Autodiff, NdArray},
        optim::AdamWConfig,
    };

    use super::*;
    use crate::{
        algo::QNetwork,
        env::{tests::MockSim, WrapperConfig},
        model::{Mlp, MlpConfig},
    };

    type TestBackend = NdArray;

    /// Returns the same action values for every state and records every training and save call
    struct StubValues {
        values: Vec<f32>,
        evaluations: Cell<usize>,
        trained: Vec<(Vec<usize>, Vec<f32>)>,
        saves: Cell<usize>,
    }

    impl StubValues {
        fn new(values: Vec<f32>) -> Self {
            Self {
                values,
                evaluations: Cell::new(0),
                trained: Vec::new(),
                saves: Cell::new(0),
            }
        }
    }

    impl<B: Backend> ValueFunction<B> for StubValues {
        fn action_values(&self, states: Tensor<B, 3>) -> Tensor<B, 2> {
            self.evaluations.set(self.evaluations.get() + 1);
            let [batch, _, _] = states.dims();
            let data = Data::new(self.values.repeat(batch), [batch, self.values.len()].into());
            Tensor::from_data(data.convert::<B::FloatElem>(), &states.device())
        }

        fn train(
            &mut self,
            _states: Tensor<B, 3>,
            actions: Tensor<B, 1, Int>,
            targets: Tensor<B, 1>,
            _learning_rate: f64,
        ) -> f32 {
            let actions = actions.into_data().convert::<i64>().value;
            self.trained.push((
                actions.into_iter().map(|a| a as usize).collect(),
                targets.into_data().convert::<f32>().value,
            ));
            0.0
        }

        fn save(&self, _path: &Path) -> Result<()> {
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    const RAW_ACTIONS: [i32; 3] = [0, 2, 3];

    fn stub_agent(
        episode_len: usize,
        values: Vec<f32>,
        config: AgentConfig,
    ) -> Agent<TestBackend, MockSim, StubValues> {
        let env = AtariWrapper::new(
            MockSim::new(episode_len),
            RAW_ACTIONS.to_vec(),
            WrapperConfig {
                observations_per_state: 2,
                seed: Some(5),
                ..Default::default()
            },
        );
        Agent::new(
            env,
            StubValues::new(values),
            AgentConfig {
                seed: Some(9),
                ..config
            },
            Default::default(),
        )
    }

    fn always_explore() -> AgentConfig {
        AgentConfig {
            start_epsilon: 1.0,
            end_epsilon: 1.0,
            anneal_duration: 0,
            ..Default::default()
        }
    }

    fn to_f32s<const N: usize>(values: [f32; N]) -> Tensor<TestBackend, 1> {
        values.as_slice().to_tensor(&Default::default())
    }

    #[test]
    fn terminal_targets_are_rewards() {
        for discount in [0.0, 0.5, 0.99, 1.0] {
            let targets = td_targets(
                to_f32s([1.0, -2.0, 0.0]),
                to_f32s([1.0, 1.0, 1.0]),
                to_f32s([10.0, 4.0, -3.0]),
                discount,
            );
            assert_eq!(
                targets.into_data().convert::<f32>().value,
                [1.0, -2.0, 0.0],
                "discount {discount}"
            );
        }
    }

    #[test]
    fn non_terminal_targets_bootstrap() {
        let rewards = [1.0, -2.0, 0.5];
        let max_next = [10.0, 4.0, -3.0];
        for discount in [0.0f32, 0.25, 0.9, 1.0] {
            let targets = td_targets(
                to_f32s(rewards),
                to_f32s([1.0, 0.0, 0.0]),
                to_f32s(max_next),
                discount,
            );
            let expected = [
                rewards[0],
                rewards[1] + max_next[1] * discount,
                rewards[2] + max_next[2] * discount,
            ];
            assert_eq!(
                targets.into_data().convert::<f32>().value,
                expected,
                "discount {discount}"
            );
        }
    }

    #[test]
    fn epsilon_anneals_per_episode() {
        let mut agent = stub_agent(
            5,
            vec![0.0, 0.0, 1.0],
            AgentConfig {
                start_epsilon: 1.0,
                end_epsilon: 0.0,
                anneal_duration: 2,
                wait_before_training: u64::MAX,
                ..Default::default()
            },
        );

        agent.train(false, 1e-3).unwrap();
        assert_eq!(agent.epsilon(), 1.0, "episode 1");
        assert_eq!(
            agent.value_function().evaluations.get(),
            0,
            "every action of episode 1 is random"
        );

        agent.train(false, 1e-3).unwrap();
        assert_eq!(agent.epsilon(), 0.5, "episode 2");

        let before = agent.value_function().evaluations.get();
        let reward = agent.train(false, 1e-3).unwrap();
        assert_eq!(agent.epsilon(), 0.0, "episode 3");
        assert_eq!(
            agent.value_function().evaluations.get() - before,
            5,
            "every action of episode 3 is greedy"
        );
        assert_eq!(reward, 15.0, "greedy action is the raw action 3");

        agent.train(false, 1e-3).unwrap();
        assert_eq!(agent.epsilon(), 0.0, "episode 4 stays clamped");
        assert_eq!(agent.episodes_played(), 4);
        assert_eq!(agent.t(), 20);
    }

    #[test]
    fn training_waits_then_follows_interval() {
        let mut agent = stub_agent(
            1,
            vec![0.0; 3],
            AgentConfig {
                wait_before_training: 5,
                train_interval: 1,
                batch_size: 2,
                ..always_explore()
            },
        );
        for t in 1..=5 {
            agent.train(false, 1e-3).unwrap();
            assert_eq!(agent.t(), t);
            assert!(agent.value_function().trained.is_empty(), "no training at t = {t}");
        }
        agent.train(false, 1e-3).unwrap();
        assert_eq!(agent.value_function().trained.len(), 1, "first training at t = 6");

        let mut agent = stub_agent(
            1,
            vec![0.0; 3],
            AgentConfig {
                wait_before_training: 5,
                train_interval: 4,
                batch_size: 2,
                ..always_explore()
            },
        );
        for _ in 0..7 {
            agent.train(false, 1e-3).unwrap();
        }
        assert!(agent.value_function().trained.is_empty(), "no training before t = 8");
        agent.train(false, 1e-3).unwrap();
        assert_eq!(agent.value_function().trained.len(), 1, "first training at t = 8");
        for _ in 0..4 {
            agent.train(false, 1e-3).unwrap();
        }
        assert_eq!(agent.value_function().trained.len(), 2, "again at t = 12");
    }

    #[test]
    fn training_uses_batched_td_targets() {
        let mut agent = stub_agent(
            2,
            vec![1.0, 3.0, 2.0],
            AgentConfig {
                wait_before_training: 4,
                train_interval: 1,
                batch_size: 4,
                discount: 0.5,
                ..always_explore()
            },
        );
        for _ in 0..10 {
            agent.train(false, 1e-3).unwrap();
        }

        let trained = &agent.value_function().trained;
        assert_eq!(trained.len(), 16, "one update per timestep after warm-up");
        for (actions, targets) in trained {
            assert_eq!(actions.len(), 4);
            assert_eq!(targets.len(), 4);
            for (&a, &target) in actions.iter().zip(targets) {
                let reward = RAW_ACTIONS[a] as f32;
                assert!(
                    target == reward || target == reward + 0.5 * 3.0,
                    "target {target} for action {a}"
                );
            }
        }
    }

    #[test]
    fn short_warm_up_fails_loudly() {
        let mut agent = stub_agent(
            3,
            vec![0.0; 3],
            AgentConfig {
                wait_before_training: 0,
                train_interval: 1,
                batch_size: 2,
                ..always_explore()
            },
        );
        assert_eq!(
            agent.train(false, 1e-3),
            Err(Error::InsufficientExperiences {
                requested: 2,
                available: 0
            })
        );
    }

    #[test]
    fn play_is_greedy_and_never_trains() {
        let mut agent = stub_agent(
            3,
            vec![0.1, 0.9, 0.3],
            AgentConfig {
                wait_before_training: 0,
                train_interval: 1,
                ..always_explore()
            },
        );

        assert_eq!(agent.play(false).unwrap(), 6.0, "raw action 2 every step");
        assert_eq!(agent.value_function().evaluations.get(), 3, "one query per step");
        assert!(agent.value_function().trained.is_empty(), "never trains");
        assert_eq!(agent.t(), 0, "timestep counter untouched");
        assert_eq!(agent.episodes_played(), 0, "episode counter untouched");

        assert_eq!(agent.play(true).unwrap(), 6.0, "restarts a finished episode");
        assert_eq!(agent.env().simulator().renders, 3, "renders once per step");
    }

    #[test]
    fn checkpoints_follow_save_interval() {
        let config = AgentConfig {
            save_interval: 4,
            wait_before_training: u64::MAX,
            ..always_explore()
        };

        let mut agent = stub_agent(3, vec![0.0; 3], config.clone());
        for _ in 0..4 {
            agent.train(false, 1e-3).unwrap();
        }
        assert_eq!(agent.t(), 12);
        assert_eq!(
            agent.value_function().saves.get(),
            0,
            "nothing saved without a checkpoint path"
        );

        let mut agent = stub_agent(3, vec![0.0; 3], config.clone()).with_checkpoint("checkpoint");
        for _ in 0..8 {
            let before = agent.value_function().saves.get();
            agent.train(false, 1e-3).unwrap();
            let t = agent.t();
            let due = (t - 2..=t).filter(|t| t % 4 == 0).count();
            assert_eq!(
                agent.value_function().saves.get() - before,
                due,
                "saved whenever t % save_interval == 0, up to t = {t}"
            );
        }
        assert_eq!(agent.value_function().saves.get(), 6, "t = 4, 8, .., 24");

        agent.save().unwrap();
        assert_eq!(agent.value_function().saves.get(), 7, "explicit save");

        let mut agent = stub_agent(
            3,
            vec![0.0; 3],
            AgentConfig {
                save_interval: 0,
                ..config
            },
        )
        .with_checkpoint("checkpoint");
        for _ in 0..8 {
            agent.train(false, 1e-3).unwrap();
        }
        assert_eq!(
            agent.value_function().saves.get(),
            0,
            "a zero interval disables periodic saves"
        );
    }

    #[test]
    #[should_panic(expected = "Invalid value for `discount`")]
    fn discount_out_of_range() {
        stub_agent(
            1,
            vec![0.0; 3],
            AgentConfig {
                discount: 1.5,
                ..Default::default()
            },
        );
    }

    /// Two states and two actions: from the start state, action 0 pays 1 and action 1 pays 0,
    /// both ending the episode
    #[derive(Default)]
    struct ToySim {
        terminal: bool,
    }

    impl Simulator for ToySim {
        type Action = u8;

        fn reset(&mut self) {
            self.terminal = false;
        }

        fn act(&mut self, action: &Self::Action) -> f32 {
            self.terminal = true;
            if *action == 0 {
                1.0
            } else {
                0.0
            }
        }

        fn observe(&self) -> Vec<f32> {
            if self.terminal {
                vec![0.0, 1.0]
            } else {
                vec![1.0, 0.0]
            }
        }

        fn is_terminal(&self) -> bool {
            self.terminal
        }
    }

    #[test]
    fn learns_the_rewarding_action() {
        type TrainBackend = Autodiff<NdArray>;
        <TrainBackend as Backend>::seed(3);

        let device = Default::default();
        let model = MlpConfig::new(2, 2)
            .with_hidden(16)
            .init::<TrainBackend>(&device);
        let optimizer = AdamWConfig::new().init::<TrainBackend, Mlp<TrainBackend>>();
        let env = AtariWrapper::new(
            ToySim::default(),
            vec![0, 1],
            WrapperConfig {
                observations_per_state: 1,
                replay_memory_capacity: 64,
                seed: Some(1),
                ..Default::default()
            },
        );
        let mut agent = Agent::new(
            env,
            QNetwork::new(model, optimizer),
            AgentConfig {
                wait_before_training: 16,
                train_interval: 1,
                batch_size: 16,
                discount: 0.9,
                seed: Some(2),
                ..always_explore()
            },
            device,
        );

        for _ in 0..500 {
            agent.train(false, 1e-2).unwrap();
        }

        assert_eq!(agent.play(false).unwrap(), 1.0, "greedy policy picks action 0");
    }
}
