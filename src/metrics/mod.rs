pub mod tracker;

pub use tracker::ScoreTracker;
