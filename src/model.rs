use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend},
};

use crate::algo::DQNModel;

/// A fully connected Q network over flattened stacked frames
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
}

#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Frames per state times frame length
    input: usize,
    n_actions: usize,
    #[config(default = 64)]
    hidden: usize,
}

impl MlpConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        Mlp {
            fc1: LinearConfig::new(self.input, self.hidden).init(device),
            fc2: LinearConfig::new(self.hidden, self.hidden).init(device),
            fc3: LinearConfig::new(self.hidden, self.n_actions).init(device),
        }
    }
}

impl<B: Backend> Mlp<B> {
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let x = input.flatten(1, 2);
        let x = relu(self.fc1.forward(x));
        let x = relu(self.fc2.forward(x));
        self.fc3.forward(x)
    }
}

impl<B: AutodiffBackend> DQNModel<B> for Mlp<B> {
    fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        Mlp::forward(self, input)
    }
}
