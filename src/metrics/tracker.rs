use crate::error::Result;
use crate::ring_buffer::RingBuffer;

/// Tracks episode scores over a sliding window of recent episodes.
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    recent: RingBuffer<usize>,
    episode_count: usize,
    total_steps: usize,
    best_score: usize,
}

impl ScoreTracker {
    /// `window` is the number of recent episodes the mean is taken over.
    pub fn new(window: usize) -> Result<Self> {
        Ok(ScoreTracker {
            recent: RingBuffer::new(window)?,
            episode_count: 0,
            total_steps: 0,
            best_score: 0,
        })
    }

    /// Record the score (frames survived) of a finished episode.
    pub fn record_episode(&mut self, score: usize) {
        self.recent.push(score);
        self.episode_count += 1;
        self.total_steps += score;
        self.best_score = self.best_score.max(score);
    }

    /// Mean over the retained window, or `0.0` before the first episode.
    pub fn mean_score(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.0;
        }
        self.recent.iter().sum::<usize>() as f32 / self.recent.len() as f32
    }

    /// Whether the mean is already taken over a complete window.
    pub fn is_window_full(&self) -> bool {
        self.recent.is_full()
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn best_score(&self) -> usize {
        self.best_score
    }
}
