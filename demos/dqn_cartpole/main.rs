use std::path::Path;

use burn::{
    backend::{wgpu::WgpuDevice, Autodiff, Wgpu},
    optim::AdamWConfig,
};
use deep_q::{
    algo::{Agent, AgentConfig, QNetwork},
    env::{AtariWrapper, WrapperConfig},
    gym::CartPole,
    model::{Mlp, MlpConfig},
};
use gym_rs::utils::renderer::RenderMode;
use log::info;
use once_cell::sync::Lazy;

type DQNBackend = Autodiff<Wgpu>;

static DEVICE: Lazy<WgpuDevice> = Lazy::new(WgpuDevice::default);

const NUM_EPISODES: u32 = 500;
const OBSERVATIONS_PER_STATE: usize = 2;
const SAVE_PATH: &str = "checkpoints/cartpole";
const LOAD_PATH: Option<&str> = None;

fn main() -> Result<(), deep_q::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let env = AtariWrapper::new(
        CartPole::new(RenderMode::Human),
        CartPole::actions(),
        WrapperConfig {
            observations_per_state: OBSERVATIONS_PER_STATE,
            replay_memory_capacity: 50000,
            max_episode_steps: Some(500),
            seed: None,
        },
    );

    let model = MlpConfig::new(OBSERVATIONS_PER_STATE * 4, env.n_actions())
        .with_hidden(128)
        .init::<DQNBackend>(&*DEVICE);
    let optimizer = AdamWConfig::new().init::<DQNBackend, Mlp<DQNBackend>>();
    let mut network = QNetwork::new(model, optimizer);
    if let Some(path) = LOAD_PATH {
        network = network.load(Path::new(path), &*DEVICE)?;
        info!("Model restored from {path}.");
    }

    let config = AgentConfig {
        anneal_duration: 250,
        end_epsilon: 0.05,
        wait_before_training: 1000,
        train_interval: 4,
        batch_size: 128,
        save_interval: 10000,
        ..Default::default()
    };
    let mut agent = Agent::new(env, network, config, DEVICE.clone()).with_checkpoint(SAVE_PATH);

    for _ in 0..NUM_EPISODES {
        agent.train(false, 1e-3)?;
    }
    agent.save()?;
    info!("Total timesteps: {}", agent.t());

    let reward = agent.play(true)?;
    info!("Evaluation episode reward: {reward}");

    Ok(())
}
