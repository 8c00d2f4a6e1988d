mod state;
mod wrapper;

pub use state::{Frame, State};
pub use wrapper::{AtariWrapper, WrapperConfig};

/// A raw game simulator, e.g. an Atari emulator
///
/// The [`AtariWrapper`] drives it one timestep at a time and turns its raw frames into
/// stacked [states](State).
pub trait Simulator {
    /// A raw action understood by the simulator
    type Action: Clone + PartialEq + std::fmt::Debug;

    /// Reset the simulator to the start of a fresh episode
    fn reset(&mut self);

    /// Apply `action` and advance one timestep
    ///
    /// **Returns** the reward for the transition
    fn act(&mut self, action: &Self::Action) -> f32;

    /// The current raw frame, flattened
    ///
    /// Every frame of a simulator must have the same length.
    fn observe(&self) -> Vec<f32>;

    /// Whether the last transition ended the episode
    fn is_terminal(&self) -> bool;

    /// Display the current frame
    fn render(&mut self) {}
}
