pub mod dqn;
mod q_network;
mod value;

pub use dqn::{Agent, AgentConfig};
pub use q_network::{DQNModel, QNetwork};
pub use value::ValueFunction;
