//! Error types for the comaze-probe crate

use thiserror::Error;

/// Main error type for the comaze-probe crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("goal ordering label {value} for goal {goal} is out of range (must be 0-{max})")]
    InvalidGoalOrderingLabel { goal: usize, value: u32, max: u32 },

    #[error("rule label {value} for rule {rule} is out of range (must be 0-{max})")]
    InvalidRuleLabel { rule: usize, value: u32, max: u32 },

    #[error("actor {actor} has an empty trajectory")]
    EmptyTrajectory { actor: usize },

    #[error("{what} has {got} entries but the batch has {expected} actors")]
    BatchSizeMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("mask for actor {actor} covers {got} timesteps but the trajectory has {expected}")]
    MaskLengthMismatch {
        actor: usize,
        expected: usize,
        got: usize,
    },

    #[error("observation has {got} elements, expected a multiple of {expected}")]
    ObservationShape { expected: usize, got: usize },

    #[error("hidden state has {got} elements, expected {expected}")]
    HiddenStateShape { expected: usize, got: usize },

    #[error("no inner state has been saved")]
    NoSavedInnerState,

    #[error("cannot train on an empty batch")]
    EmptyBatch,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
