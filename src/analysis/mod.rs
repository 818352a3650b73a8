//! Analysis tools for probe predictions
//!
//! Percentiles follow numpy's `nanpercentile` conventions for the lower,
//! higher and nearest methods.

pub mod percentile;
pub mod stats;

pub use percentile::{Interpolation, percentile};
pub use stats::{
    CorrectIndexStats, MeanStd, NO_CORRECT_PREDICTION_SENTINEL, fully_correct_indices,
};
