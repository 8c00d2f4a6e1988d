use rand::Rng;

use crate::{
    ds::RingBuffer,
    error::{Error, Result},
};

use super::{Exp, ExpBatch};

/// A fixed-size memory storage for reinforcement learning experiences
///
/// This structure uses a ring buffer to store experiences. It automatically overwrites the
/// oldest experiences once it reaches its capacity. Sampling is uniform and with replacement.
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    memory: RingBuffer<Exp>,
}

impl ReplayMemory {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: RingBuffer::new(capacity),
        }
    }

    /// Add a new experience to the memory
    pub fn push(&mut self, exp: Exp) {
        self.memory.push(exp);
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Stored experiences in storage order
    pub fn view(&self) -> &[Exp] {
        self.memory.view()
    }

    /// Draw `batch_size` experiences, each independently and uniformly
    ///
    /// ### Errors
    /// [`Error::InsufficientExperiences`] if `batch_size` exceeds the number of stored experiences
    pub fn sample(&self, batch_size: usize, rng: &mut impl Rng) -> Result<Vec<&Exp>> {
        let available = self.memory.len();
        if available == 0 || batch_size > available {
            return Err(Error::InsufficientExperiences {
                requested: batch_size,
                available,
            });
        }

        Ok((0..batch_size)
            .map(|_| &self.memory[rng.gen_range(0..available)])
            .collect())
    }

    /// Sample a batch of experiences and zip the vector of tuples into a tuple of vectors
    pub fn sample_zipped(&self, batch_size: usize, rng: &mut impl Rng) -> Result<ExpBatch> {
        let experiences = self.sample(batch_size, rng)?;
        Ok(ExpBatch::from_iter(experiences, batch_size))
    }
}
