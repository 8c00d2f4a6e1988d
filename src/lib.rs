/// Deep Q-learning agent
pub mod algo;

/// Time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Simulator contract and the frame-stacking environment wrapper
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Experience replay
pub mod memory;

/// Ready-made value networks
pub mod model;

/// Tensor conversions
pub mod traits;

/// Simulators for testing and demos
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use error::{Error, Result};
