use std::path::Path;

use burn::prelude::*;

use crate::error::Result;

/// An approximation of the action-value function Q(state, action)
///
/// States are batched as `[batch, n_frames, frame_len]` and each row of the output holds one
/// value per action, addressed by the action's index in the action space.
pub trait ValueFunction<B: Backend> {
    /// Q values of every action for each state in the batch, `[batch, n_actions]`
    fn action_values(&self, states: Tensor<B, 3>) -> Tensor<B, 2>;

    /// Index of the highest valued action for each state
    fn optimal_action(&self, states: Tensor<B, 3>) -> Tensor<B, 1, Int> {
        self.action_values(states).argmax(1).squeeze(1)
    }

    /// Highest action value for each state
    fn optimal_action_value(&self, states: Tensor<B, 3>) -> Tensor<B, 1> {
        self.action_values(states).max_dim(1).squeeze(1)
    }

    /// Take one gradient step minimizing the squared error between Q(state, action) and `targets`
    ///
    /// **Returns** the loss before the step
    fn train(
        &mut self,
        states: Tensor<B, 3>,
        actions: Tensor<B, 1, Int>,
        targets: Tensor<B, 1>,
        learning_rate: f64,
    ) -> f32;

    /// Persist the current parameters to `path`
    fn save(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
