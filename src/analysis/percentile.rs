//! Percentiles with numpy `nanpercentile` semantics.

use serde::{Deserialize, Serialize};

/// How a percentile falling between two observations is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Linear interpolation between the neighbours
    Linear,
    /// The lower neighbour
    Lower,
    /// The higher neighbour
    Higher,
    /// The nearest neighbour, ties to the even index
    Nearest,
    /// Mean of the lower and higher neighbours
    Midpoint,
}

/// `q`-th percentile (`0..=100`) of `values`, ignoring NaNs.
///
/// Returns `None` if no non-NaN values remain.
pub fn percentile(values: &[f64], q: f64, interpolation: Interpolation) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 100.0) / 100.0;
    let last = sorted.len() - 1;
    let virtual_index = q * last as f64;
    let below = (virtual_index.floor() as usize).min(last);
    let above = (virtual_index.ceil() as usize).min(last);

    let value = match interpolation {
        Interpolation::Lower => sorted[below],
        Interpolation::Higher => sorted[above],
        Interpolation::Nearest => sorted[(virtual_index.round_ties_even() as usize).min(last)],
        Interpolation::Midpoint => (sorted[below] + sorted[above]) / 2.0,
        Interpolation::Linear => {
            let gamma = virtual_index - below as f64;
            sorted[below] + gamma * (sorted[above] - sorted[below])
        }
    };
    Some(value)
}
