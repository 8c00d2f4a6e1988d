use std::path::Path;

use burn::{
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{GradientsParams, Optimizer},
    prelude::*,
    record::CompactRecorder,
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::error::{Error, Result};

use super::ValueFunction;

/// A burn module used as the network of a [`QNetwork`]
pub trait DQNModel<B: AutodiffBackend>: AutodiffModule<B> {
    /// Forward pass from `[batch, n_frames, frame_len]` states to `[batch, n_actions]` values
    fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2>;
}

/// A [`ValueFunction`] backed by a burn model, trained with mean squared error
///
/// ### Generics
/// - `B`: An autodiff backend
/// - `M`: The [`DQNModel`]
/// - `O`: An [`Optimizer`] for `M`
pub struct QNetwork<B, M, O>
where
    B: AutodiffBackend,
{
    model: M,
    optimizer: O,
    loss: MseLoss<B>,
}

impl<B, M, O> QNetwork<B, M, O>
where
    B: AutodiffBackend,
    M: DQNModel<B>,
    O: Optimizer<M, B>,
{
    pub fn new(model: M, optimizer: O) -> Self {
        Self {
            model,
            optimizer,
            loss: MseLoss::new(),
        }
    }

    /// Replace the parameters with a checkpoint previously written by [`ValueFunction::save`]
    pub fn load(mut self, path: &Path, device: &B::Device) -> Result<Self> {
        self.model = self
            .model
            .load_file(path, &CompactRecorder::new(), device)
            .map_err(|err| Error::Checkpoint {
                path: path.to_path_buf(),
                message: format!("{err:?}"),
            })?;
        Ok(self)
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<B, M, O> ValueFunction<B> for QNetwork<B, M, O>
where
    B: AutodiffBackend,
    M: DQNModel<B>,
    O: Optimizer<M, B>,
{
    fn action_values(&self, states: Tensor<B, 3>) -> Tensor<B, 2> {
        self.model.forward(states).detach()
    }

    fn train(
        &mut self,
        states: Tensor<B, 3>,
        actions: Tensor<B, 1, Int>,
        targets: Tensor<B, 1>,
        learning_rate: f64,
    ) -> f32 {
        // Q values of the actions actually taken
        let q_values = self
            .model
            .forward(states)
            .gather(1, actions.unsqueeze_dim(1))
            .squeeze(1);

        let loss = self
            .loss
            .forward(q_values, targets.detach(), Reduction::Mean);
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = GradientsParams::from_grads(loss.backward(), &self.model);
        self.model = self
            .optimizer
            .step(learning_rate, self.model.clone(), grads);

        loss_value
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.model
            .clone()
            .save_file(path, &CompactRecorder::new())
            .map_err(|err| Error::Checkpoint {
                path: path.to_path_buf(),
                message: format!("{err:?}"),
            })
    }
}
