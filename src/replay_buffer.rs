use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{DqnError, Result};
use crate::ring_buffer::RingBuffer;

/// One environment step as seen by the agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub terminal: bool,
}

/// Bounded experience replay memory with uniform sampling.
///
/// The memory keeps the `capacity` most recently appended transitions and
/// draws batches uniformly at random without replacement. The random source
/// is owned by the memory so that sampling is reproducible under a seed.
pub struct ReplayMemory<R: Rng = StdRng> {
    buffer: RingBuffer<Transition>,
    rng: R,
}

impl ReplayMemory<StdRng> {
    /// Create a memory seeded from system entropy.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_rng(capacity, StdRng::from_entropy())
    }
}

impl<R: Rng> ReplayMemory<R> {
    /// Create a memory sampling from `rng`. Fails when `capacity` is zero.
    pub fn with_rng(capacity: usize, rng: R) -> Result<Self> {
        Ok(ReplayMemory {
            buffer: RingBuffer::new(capacity)?,
            rng,
        })
    }

    /// Store a transition, dropping the oldest one when full.
    pub fn append(&mut self, transition: Transition) {
        self.buffer.push(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    ///
    /// Asking for more transitions than are stored is a caller error and
    /// yields [`DqnError::InsufficientSamples`]; a short batch is never returned.
    pub fn sample(&mut self, batch_size: usize) -> Result<Vec<&Transition>> {
        let available = self.buffer.len();
        if batch_size > available {
            return Err(DqnError::InsufficientSamples {
                requested: batch_size,
                available,
            });
        }

        let indices = index::sample(&mut self.rng, available, batch_size);
        let buffer = &self.buffer;
        Ok(indices
            .into_iter()
            .filter_map(|i| buffer.get(i))
            .collect())
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Iterate over stored transitions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.buffer.iter()
    }
}
