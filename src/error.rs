use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the environment wrapper and the learning agent
///
/// None of these are recoverable by the agent: they are propagated to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid action: {action} is not in the action space")]
    InvalidAction { action: String },

    #[error("episode already finished, call `restart` before stepping again")]
    EpisodeFinished,

    #[error("cannot sample {requested} experiences from a memory holding {available}")]
    InsufficientExperiences { requested: usize, available: usize },

    #[error("failed to save checkpoint to {path:?}: {message}")]
    Checkpoint { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
