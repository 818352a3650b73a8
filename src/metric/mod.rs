//! Goal ordering and rule prediction metric
//!
//! A probe network reads, at every timestep of an actor's trajectory, the
//! recurrent hidden state of the agent and predicts:
//!
//! - for each of the 4 goals, the order class (5 classes) in which the agent
//!   expects the goal to be reached,
//! - for each of the 4 rules, its assignment (4 classes).
//!
//! The per-timestep negative log-likelihood of both heads is accumulated per
//! actor under the timestep mask. Accuracy is the share of timesteps at which
//! all 4 goals (respectively rules) are predicted correctly, and the
//! distribution of those timesteps is summarised by its quartiles.
//!
//! ## Frozen and biasing evaluation
//!
//! | Mode | Policy used | Hidden states | Policy state afterwards |
//! |------|-------------|---------------|-------------------------|
//! | frozen | a clone | detached | untouched |
//! | biasing | the metric's own | carry gradient | reset for its actors, then restored |

mod batch;
mod output;

use candle_core::{D, DType, Tensor};
use candle_nn::ops::log_softmax;
use log::{debug, info};

pub use batch::ProbeBatch;
pub use output::{ActorReport, BatchSummary, GoalOrderingPredictionOutput, MetricReport};

use crate::{
    Error, Result,
    analysis::CorrectIndexStats,
    config::MetricConfig,
    ports::HiddenStatePolicy,
    probe::PredictionNet,
    types::{GoalOrderingLabels, NUM_GOALS, NUM_RULES, RuleLabels},
};

/// Probe-based metric scoring a policy's hidden state against goal ordering
/// and rule labels.
///
/// # Examples
///
/// ```no_run
/// use candle_core::Device;
/// use comaze_probe::{
///     GoalOrderingLabels, GoalOrderingPredictionMetric, MetricConfig, RuleLabels,
///     adapters::RecurrentPolicy,
/// };
///
/// let policy = RecurrentPolicy::new(4, 16, 2, &Device::Cpu)?;
/// let mut metric = GoalOrderingPredictionMetric::new(policy, &MetricConfig::new())?;
///
/// let x = vec![vec![vec![0.0f32; 4]; 3]];
/// let y = vec![GoalOrderingLabels::new([0, 1, 2, 3])?];
/// let yp = vec![RuleLabels::new([3, 2, 1, 0])?];
///
/// let output = metric.compute_goal_ordering_prediction_loss(&x, &y, &yp, None, false)?;
/// assert_eq!(output.nbr_actors(), 1);
/// # Ok::<(), comaze_probe::Error>(())
/// ```
pub struct GoalOrderingPredictionMetric<P: HiddenStatePolicy> {
    policy: P,
    probe: PredictionNet,
}

impl<P> GoalOrderingPredictionMetric<P>
where
    P: HiddenStatePolicy + Clone,
{
    /// Build the probe on top of `policy`'s hidden state.
    pub fn new(policy: P, config: &MetricConfig) -> Result<Self> {
        let device = config.device.device()?;
        let probe = PredictionNet::new(policy.hidden_state_dim(), config, &device)?;
        info!("{probe} ({} parameters)", probe.num_parameters());
        Ok(Self { policy, probe })
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn probe(&self) -> &PredictionNet {
        &self.probe
    }

    pub fn into_policy(self) -> P {
        self.policy
    }

    /// Score the policy's hidden states on a batch of actor trajectories.
    ///
    /// # Arguments
    ///
    /// * `x` - For each actor, one observation per timestep
    /// * `y` - For each actor, the goal ordering labels
    /// * `yp` - For each actor, the rule labels
    /// * `mask` - For each actor, one loss weight per timestep (all ones if `None`)
    /// * `biasing` - Back-propagate into the policy instead of freezing it
    ///
    /// In biasing mode the policy's inner state is saved first; afterwards the
    /// policy is reset for its own actors in training mode and the saved state
    /// restored, whether or not evaluation succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the label or mask batches do not match `x`, if a
    /// mask row is shorter than its trajectory, if an actor has no timesteps,
    /// or if the policy or tensor backend fails.
    pub fn compute_goal_ordering_prediction_loss(
        &mut self,
        x: &[Vec<P::Observation>],
        y: &[GoalOrderingLabels],
        yp: &[RuleLabels],
        mask: Option<&[Vec<f32>]>,
        biasing: bool,
    ) -> Result<GoalOrderingPredictionOutput> {
        validate_batch(x, y, yp, mask)?;

        if !biasing {
            let mut policy = self.policy.clone();
            return evaluate_batch(&self.probe, &mut policy, x, y, yp, mask, false);
        }

        let nbr_actors = self.policy.nbr_actors();
        self.policy.save_inner_state()?;
        let result = evaluate_batch(&self.probe, &mut self.policy, x, y, yp, mask, true);
        let restored = self
            .policy
            .reset(nbr_actors, true)
            .and_then(|()| self.policy.restore_inner_state());

        let output = result?;
        restored?;
        Ok(output)
    }

    /// [`Self::compute_goal_ordering_prediction_loss`] over a [`ProbeBatch`].
    pub fn evaluate(
        &mut self,
        batch: &ProbeBatch<P::Observation>,
        biasing: bool,
    ) -> Result<GoalOrderingPredictionOutput> {
        self.compute_goal_ordering_prediction_loss(
            &batch.observations,
            &batch.goal_orderings,
            &batch.rules,
            batch.masks.as_deref(),
            biasing,
        )
    }
}

fn validate_batch<O>(
    x: &[Vec<O>],
    y: &[GoalOrderingLabels],
    yp: &[RuleLabels],
    mask: Option<&[Vec<f32>]>,
) -> Result<()> {
    let expected = x.len();
    let check = |what: &str, got: usize| {
        if got == expected {
            Ok(())
        } else {
            Err(Error::BatchSizeMismatch {
                what: what.to_string(),
                expected,
                got,
            })
        }
    };
    check("goal ordering labels", y.len())?;
    check("rule labels", yp.len())?;

    for (actor, observations) in x.iter().enumerate() {
        if observations.is_empty() {
            return Err(Error::EmptyTrajectory { actor });
        }
    }

    if let Some(mask) = mask {
        check("mask", mask.len())?;
        for (actor, (row, observations)) in mask.iter().zip(x).enumerate() {
            if row.len() < observations.len() {
                return Err(Error::MaskLengthMismatch {
                    actor,
                    expected: observations.len(),
                    got: row.len(),
                });
            }
        }
    }
    Ok(())
}

/// One actor's losses and per-timestep correctness.
struct ActorEvaluation {
    l_gop: Tensor,
    l_rp: Tensor,
    goal_correct: Vec<[bool; NUM_GOALS]>,
    rule_correct: Vec<[bool; NUM_RULES]>,
}

fn evaluate_batch<P: HiddenStatePolicy>(
    probe: &PredictionNet,
    policy: &mut P,
    x: &[Vec<P::Observation>],
    y: &[GoalOrderingLabels],
    yp: &[RuleLabels],
    mask: Option<&[Vec<f32>]>,
    biasing: bool,
) -> Result<GoalOrderingPredictionOutput> {
    let batch_size = x.len();
    let mut l_gop = Vec::with_capacity(batch_size);
    let mut l_rp = Vec::with_capacity(batch_size);
    let mut gop_index_stats = Vec::with_capacity(batch_size);
    let mut rp_index_stats = Vec::with_capacity(batch_size);
    let mut per_actor_gop_accuracy = Vec::with_capacity(batch_size);
    let mut per_actor_rp_accuracy = Vec::with_capacity(batch_size);

    for (actor, observations) in x.iter().enumerate() {
        let actor_mask = mask.map(|m| m[actor].as_slice());
        let eval = evaluate_actor(
            probe,
            policy,
            observations,
            &y[actor],
            &yp[actor],
            actor_mask,
            biasing,
        )?;

        let timesteps = observations.len();
        let gop = CorrectIndexStats::from_correctness(&eval.goal_correct);
        let rp = CorrectIndexStats::from_correctness(&eval.rule_correct);
        debug!(
            "actor {actor}: {timesteps} steps, goal ordering {:.1}% (q1 {}), rules {:.1}% (q1 {})",
            gop.accuracy(timesteps),
            gop.q1,
            rp.accuracy(timesteps),
            rp.q1
        );

        per_actor_gop_accuracy.push(gop.accuracy(timesteps) as f32);
        per_actor_rp_accuracy.push(rp.accuracy(timesteps) as f32);
        gop_index_stats.push(gop);
        rp_index_stats.push(rp);
        l_gop.push(eval.l_gop);
        l_rp.push(eval.l_rp);
    }

    Ok(GoalOrderingPredictionOutput {
        l_gop: stack_losses(&l_gop, probe)?,
        per_actor_acc_distr_q1: gop_index_stats.iter().map(|s| s.q1 as f32).collect(),
        per_actor_gop_accuracy,
        l_rp: stack_losses(&l_rp, probe)?,
        per_actor_rp_acc_distr_q1: rp_index_stats.iter().map(|s| s.q1 as f32).collect(),
        per_actor_rp_accuracy,
        gop_index_stats,
        rp_index_stats,
    })
}

fn evaluate_actor<P: HiddenStatePolicy>(
    probe: &PredictionNet,
    policy: &mut P,
    observations: &[P::Observation],
    goal_labels: &GoalOrderingLabels,
    rule_labels: &RuleLabels,
    mask: Option<&[f32]>,
    biasing: bool,
) -> Result<ActorEvaluation> {
    let device = probe.device();
    policy.reset(1, false)?;

    let goal_targets = goal_labels.to_index_tensor(device)?;
    let rule_targets = rule_labels.to_index_tensor(device)?;

    let mut l_gop = Tensor::zeros((), DType::F32, device)?;
    let mut l_rp = Tensor::zeros((), DType::F32, device)?;
    let mut goal_correct = Vec::with_capacity(observations.len());
    let mut rule_correct = Vec::with_capacity(observations.len());

    for (t, observation) in observations.iter().enumerate() {
        let weight = mask.map_or(1.0, |m| m[t]) as f64;

        let hs = policy.hidden_state(observation)?;
        let hs = if biasing { hs } else { hs.detach() };
        if hs.elem_count() != probe.input_dim() {
            return Err(Error::HiddenStateShape {
                expected: probe.input_dim(),
                got: hs.elem_count(),
            });
        }
        let hs = hs.to_device(device)?.to_dtype(DType::F32)?;

        let logits = probe.predict(&hs)?;
        let log_ordering = log_softmax(&logits.ordering, D::Minus1)?;
        let log_rules = log_softmax(&logits.rules, D::Minus1)?;

        goal_correct.push(head_correctness(&log_ordering, goal_labels.values())?);
        rule_correct.push(head_correctness(&log_rules, rule_labels.values())?);

        let l_gop_t = nll_sum(&log_ordering, &goal_targets)?;
        let l_rp_t = nll_sum(&log_rules, &rule_targets)?;
        l_gop = (l_gop + l_gop_t.affine(weight, 0.0)?)?;
        l_rp = (l_rp + l_rp_t.affine(weight, 0.0)?)?;
    }

    Ok(ActorEvaluation {
        l_gop,
        l_rp,
        goal_correct,
        rule_correct,
    })
}

/// Sum over rows of `-log_probs[row, target[row]]`.
fn nll_sum(log_probs: &Tensor, targets: &Tensor) -> Result<Tensor> {
    Ok(log_probs.gather(targets, 1)?.sum_all()?.neg()?)
}

/// Whether the argmax of each row equals its label.
fn head_correctness<const N: usize>(log_probs: &Tensor, labels: &[u32; N]) -> Result<[bool; N]> {
    let predicted = log_probs.argmax(D::Minus1)?.to_vec1::<u32>()?;
    Ok(std::array::from_fn(|i| predicted[i] == labels[i]))
}

fn stack_losses(losses: &[Tensor], probe: &PredictionNet) -> Result<Tensor> {
    if losses.is_empty() {
        return Ok(Tensor::zeros(0, DType::F32, probe.device())?);
    }
    Ok(Tensor::stack(losses, 0)?)
}

#[cfg(test)]
mod tests {
    use candle_core::Device;

    use super::*;

    #[test]
    fn nll_picks_target_log_probability() {
        let device = Device::Cpu;
        let log_probs = Tensor::new(&[[-0.1f32, -2.0, -3.0], [-1.0, -0.5, -4.0]], &device).unwrap();
        let targets = Tensor::new(&[[0u32], [2]], &device).unwrap();
        let loss = nll_sum(&log_probs, &targets).unwrap().to_scalar::<f32>().unwrap();
        assert!((loss - 4.1).abs() < 1e-6);
    }

    #[test]
    fn correctness_compares_argmax_to_labels() {
        let device = Device::Cpu;
        let log_probs = Tensor::new(&[[0.0f32, 1.0], [2.0, 1.0], [0.0, 3.0]], &device).unwrap();
        let correct = head_correctness(&log_probs, &[1, 1, 1]).unwrap();
        assert_eq!(correct, [true, false, true]);
    }
}
