use log::trace;
use rand::Rng;

use crate::decay::Decay;

use super::Choice;

/// Epsilon greedy exploration policy with an episode-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Epsilon for the given (zero-based) episode
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Draw `r` uniformly from `[0, 1)` and explore if `r < epsilon`
    ///
    /// Lets a caller evaluate the schedule once per episode and reuse the value for every step.
    pub fn choose_at(&self, epsilon: f32, rng: &mut impl Rng) -> Choice {
        let r = rng.gen::<f32>();
        let choice = if r < epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        };
        trace!("r = {r:.4}, epsilon = {epsilon:.4}: {choice:?}");
        choice
    }
}
