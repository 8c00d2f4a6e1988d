use burn::{prelude::*, tensor::BasicOps};

use crate::env::State;

/// A trait for converting items to tensors
///
/// Implemented for slices of batch fields so a sampled [`ExpBatch`](crate::memory::ExpBatch)
/// can be handed to a value function in one go.
pub trait ToTensor<B: Backend, const D: usize, K: BasicOps<B>> {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, D, K>;
}

/// A batch of states as `[batch, n_frames, frame_len]`
impl<B: Backend> ToTensor<B, 3, Float> for &[State] {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 3> {
        let (n_frames, frame_len) = self
            .first()
            .map_or((0, 0), |s| (s.len(), s.frame_len()));
        let values = self.iter().flat_map(State::to_vec).collect::<Vec<f32>>();
        debug_assert_eq!(values.len(), self.len() * n_frames * frame_len, "ragged states");

        let data = Data::new(values, [self.len(), n_frames, frame_len].into());
        Tensor::from_data(data.convert::<B::FloatElem>(), device)
    }
}

/// Action indices
impl<B: Backend> ToTensor<B, 1, Int> for &[usize] {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 1, Int> {
        let data = Data::new(
            self.iter().map(|&a| a as i64).collect::<Vec<_>>(),
            [self.len()].into(),
        );
        Tensor::from_data(data.convert::<B::IntElem>(), device)
    }
}

impl<B: Backend> ToTensor<B, 1, Float> for &[f32] {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 1> {
        let data = Data::new(self.to_vec(), [self.len()].into());
        Tensor::from_data(data.convert::<B::FloatElem>(), device)
    }
}

/// Flags as a `0.0`/`1.0` mask
impl<B: Backend> ToTensor<B, 1, Float> for &[bool] {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 1> {
        self.iter()
            .map(|&flag| if flag { 1.0 } else { 0.0 })
            .collect::<Vec<f32>>()
            .as_slice()
            .to_tensor(device)
    }
}
