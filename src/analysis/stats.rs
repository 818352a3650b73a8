//! Statistics over correct-prediction timesteps and across actors

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::analysis::percentile::{Interpolation, percentile};

/// Value reported for every quantile when no timestep was fully correct.
pub const NO_CORRECT_PREDICTION_SENTINEL: f64 = 100.0;

/// Distribution of the timesteps at which every head was predicted correctly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectIndexStats {
    /// Number of fully-correct timesteps
    pub count: usize,
    /// 50th percentile, nearest observation
    pub median: f64,
    /// 25th percentile, lower observation
    pub q1: f64,
    /// 75th percentile, higher observation
    pub q3: f64,
    /// `q3 - q1`
    pub iqr: f64,
}

impl CorrectIndexStats {
    /// Statistics for an empty set of correct timesteps.
    pub const fn sentinel() -> Self {
        Self {
            count: 0,
            median: NO_CORRECT_PREDICTION_SENTINEL,
            q1: NO_CORRECT_PREDICTION_SENTINEL,
            q3: NO_CORRECT_PREDICTION_SENTINEL,
            iqr: 0.0,
        }
    }

    pub fn from_indices(indices: &[usize]) -> Self {
        let values: Vec<f64> = indices.iter().map(|&i| i as f64).collect();
        let (Some(median), Some(q1), Some(q3)) = (
            percentile(&values, 50.0, Interpolation::Nearest),
            percentile(&values, 25.0, Interpolation::Lower),
            percentile(&values, 75.0, Interpolation::Higher),
        ) else {
            return Self::sentinel();
        };

        Self {
            count: indices.len(),
            median,
            q1,
            q3,
            iqr: q3 - q1,
        }
    }

    /// Statistics over the rows of a per-timestep correctness table in which
    /// every column is correct.
    pub fn from_correctness<const N: usize>(rows: &[[bool; N]]) -> Self {
        Self::from_indices(&fully_correct_indices(rows))
    }

    /// Share of `timesteps` that were fully correct, in percent.
    pub fn accuracy(&self, timesteps: usize) -> f64 {
        if timesteps == 0 {
            return 0.0;
        }
        self.count as f64 / timesteps as f64 * 100.0
    }
}

/// Indices of the rows in which every column is `true`.
pub fn fully_correct_indices<const N: usize>(rows: &[[bool; N]]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(|&c| c))
        .map(|(t, _)| t)
        .collect()
}

/// Mean and sample standard deviation of one quantity across actors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std_dev: f64,
}

impl MeanStd {
    /// Zero for an empty slice; the deviation is zero below two samples.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let std_dev = if values.len() < 2 { 0.0 } else { values.std_dev() };
        Self {
            mean: values.mean(),
            std_dev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_uses_sentinel() {
        let stats = CorrectIndexStats::from_indices(&[]);
        assert_eq!(stats, CorrectIndexStats::sentinel());
        assert_eq!(stats.q1, 100.0);
        assert_eq!(stats.iqr, 0.0);
    }

    #[test]
    fn quartiles_of_late_correct_timesteps() {
        let stats = CorrectIndexStats::from_indices(&[3, 4, 5, 6, 7]);
        // virtual indices: q25 -> 1.0, q50 -> 2.0, q75 -> 3.0
        assert_eq!(stats.count, 5);
        assert_eq!(stats.q1, 4.0);
        assert_eq!(stats.median, 5.0);
        assert_eq!(stats.q3, 6.0);
        assert_eq!(stats.iqr, 2.0);
    }

    #[test]
    fn single_correct_timestep() {
        let stats = CorrectIndexStats::from_indices(&[9]);
        assert_eq!((stats.q1, stats.median, stats.q3, stats.iqr), (9.0, 9.0, 9.0, 0.0));
    }

    #[test]
    fn only_fully_correct_rows_count() {
        let rows = [
            [true, true, true, false],
            [true, true, true, true],
            [false, false, false, false],
            [true, true, true, true],
        ];
        assert_eq!(fully_correct_indices(&rows), vec![1, 3]);
        let stats = CorrectIndexStats::from_correctness(&rows);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.accuracy(rows.len()), 50.0);
    }

    #[test]
    fn mean_std_handles_small_samples() {
        assert_eq!(MeanStd::of(&[]), MeanStd::default());
        assert_eq!(MeanStd::of(&[2.5]), MeanStd { mean: 2.5, std_dev: 0.0 });
        let spread = MeanStd::of(&[1.0, 3.0]);
        assert_eq!(spread.mean, 2.0);
        assert!((spread.std_dev - 2f64.sqrt()).abs() < 1e-12);
    }
}
