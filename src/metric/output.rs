//! Metric output and its serialisable report

use candle_core::Tensor;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    analysis::{CorrectIndexStats, MeanStd},
};

/// Result of one metric evaluation over a batch of actors.
///
/// Loss tensors keep their autograd graph: the probe parameters always
/// receive gradient, the policy parameters only in biasing mode.
#[derive(Debug, Clone)]
pub struct GoalOrderingPredictionOutput {
    /// Masked goal ordering NLL per actor, shape `B`
    pub l_gop: Tensor,
    /// Percentage of timesteps with all goals ordered correctly
    pub per_actor_gop_accuracy: Vec<f32>,
    /// First quartile of the fully-correct goal ordering timesteps
    pub per_actor_acc_distr_q1: Vec<f32>,

    /// Masked rule NLL per actor, shape `B`
    pub l_rp: Tensor,
    /// Percentage of timesteps with all rules predicted correctly
    pub per_actor_rp_accuracy: Vec<f32>,
    /// First quartile of the fully-correct rule timesteps
    pub per_actor_rp_acc_distr_q1: Vec<f32>,

    pub gop_index_stats: Vec<CorrectIndexStats>,
    pub rp_index_stats: Vec<CorrectIndexStats>,
}

impl GoalOrderingPredictionOutput {
    pub fn nbr_actors(&self) -> usize {
        self.per_actor_gop_accuracy.len()
    }

    /// Detach every value into plain numbers.
    pub fn report(&self) -> Result<MetricReport> {
        let l_gop = self.l_gop.to_vec1::<f32>()?;
        let l_rp = self.l_rp.to_vec1::<f32>()?;

        let actors: Vec<ActorReport> = (0..self.nbr_actors())
            .map(|actor| ActorReport {
                actor,
                l_gop: l_gop[actor] as f64,
                gop_accuracy: self.per_actor_gop_accuracy[actor] as f64,
                gop: self.gop_index_stats[actor],
                l_rp: l_rp[actor] as f64,
                rp_accuracy: self.per_actor_rp_accuracy[actor] as f64,
                rp: self.rp_index_stats[actor],
            })
            .collect();

        let summary = BatchSummary::from_actors(&actors);
        Ok(MetricReport { actors, summary })
    }
}

/// Plain-number view of one actor's evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorReport {
    pub actor: usize,
    pub l_gop: f64,
    pub gop_accuracy: f64,
    pub gop: CorrectIndexStats,
    pub l_rp: f64,
    pub rp_accuracy: f64,
    pub rp: CorrectIndexStats,
}

/// Cross-actor means and deviations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub actors: usize,
    pub l_gop: MeanStd,
    pub gop_accuracy: MeanStd,
    pub gop_q1: MeanStd,
    pub l_rp: MeanStd,
    pub rp_accuracy: MeanStd,
    pub rp_q1: MeanStd,
}

impl BatchSummary {
    pub fn from_actors(actors: &[ActorReport]) -> Self {
        let column = |f: fn(&ActorReport) -> f64| -> MeanStd {
            MeanStd::of(&actors.iter().map(f).collect::<Vec<_>>())
        };

        Self {
            actors: actors.len(),
            l_gop: column(|a| a.l_gop),
            gop_accuracy: column(|a| a.gop_accuracy),
            gop_q1: column(|a| a.gop.q1),
            l_rp: column(|a| a.l_rp),
            rp_accuracy: column(|a| a.rp_accuracy),
            rp_q1: column(|a| a.rp.q1),
        }
    }
}

/// Serialisable report of a metric evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub actors: Vec<ActorReport>,
    pub summary: BatchSummary,
}
