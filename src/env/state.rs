use std::{collections::VecDeque, sync::Arc};

/// A single raw observation, flattened
///
/// Frames are shared between consecutive states and the experiences that hold them.
pub type Frame = Arc<[f32]>;

/// The `n` most recent frames, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    frames: VecDeque<Frame>,
}

impl State {
    /// A state made of `n` copies of `frame`, used at the start of an episode
    ///
    /// **Panics** if `n` is zero
    pub fn seeded(frame: Frame, n: usize) -> Self {
        assert!(n > 0, "A state must hold at least one frame.");
        Self {
            frames: std::iter::repeat(frame).take(n).collect(),
        }
    }

    /// Append the newest frame and drop the oldest
    pub fn push(&mut self, frame: Frame) {
        debug_assert_eq!(frame.len(), self.frame_len(), "frame length changed");
        self.frames.pop_front();
        self.frames.push_back(frame);
    }

    /// Number of stacked frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Length of each frame
    pub fn frame_len(&self) -> usize {
        self.frames.front().map_or(0, |f| f.len())
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn latest(&self) -> Option<&Frame> {
        self.frames.back()
    }

    /// All frames concatenated, oldest first
    pub fn to_vec(&self) -> Vec<f32> {
        self.frames.iter().flat_map(|f| f.iter().copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_then_shifted() {
        let mut state = State::seeded(Frame::from([1.0, 1.5]), 3);
        assert_eq!(state.len(), 3);
        assert_eq!(state.frame_len(), 2);
        assert_eq!(state.to_vec(), [1.0, 1.5, 1.0, 1.5, 1.0, 1.5], "padded from first frame");

        state.push(Frame::from([2.0, 2.5]));
        state.push(Frame::from([3.0, 3.5]));
        assert_eq!(state.len(), 3, "frame count is fixed");
        assert_eq!(state.to_vec(), [1.0, 1.5, 2.0, 2.5, 3.0, 3.5], "oldest first");
        assert_eq!(state.latest().map(|f| f[0]), Some(3.0));

        state.push(Frame::from([4.0, 4.5]));
        assert_eq!(state.to_vec(), [2.0, 2.5, 3.0, 3.5, 4.0, 4.5], "oldest dropped");
    }

    #[test]
    fn frames_are_shared() {
        let frame = Frame::from([0.0; 8]);
        let state = State::seeded(frame.clone(), 4);
        let copy = state.clone();
        assert!(copy.frames().all(|f| Arc::ptr_eq(f, &frame)), "cloning shares frame data");
    }

    #[test]
    #[should_panic(expected = "at least one frame")]
    fn empty_state_rejected() {
        State::seeded(Frame::from([0.0]), 0);
    }
}
