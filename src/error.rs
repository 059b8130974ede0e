use thiserror::Error;

/// Result type for cartpole-dqn operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the agent, its model backend and the environment
#[derive(Debug, Error)]
pub enum DqnError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action outside of the action space
    #[error("Invalid action {action}: must be less than {max_actions}")]
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Sampling more transitions than the memory holds
    #[error("Cannot sample {requested} transitions from a memory holding {available}")]
    InsufficientSamples {
        requested: usize,
        available: usize,
    },

    /// Numerical computation errors
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Failure reported by the simulation environment
    #[error("Environment error: {0}")]
    Environment(String),

    /// IO errors (config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization errors
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
