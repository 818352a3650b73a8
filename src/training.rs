//! Optimisation of the probe (and, in biasing mode, the policy).

use candle_nn::{AdamW, Optimizer, ParamsAdamW};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::MetricConfig,
    metric::{GoalOrderingPredictionMetric, GoalOrderingPredictionOutput, ProbeBatch},
    ports::HiddenStatePolicy,
};

/// Scalar losses of one optimisation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepLosses {
    /// Mean goal ordering loss over actors
    pub l_gop: f64,
    /// Mean rule loss over actors
    pub l_rp: f64,
    /// `l_gop + l_rp`, the optimised quantity
    pub total: f64,
}

/// AdamW trainer minimising `mean(l_gop) + mean(l_rp)`.
pub struct ProbeTrainer {
    optimizer: AdamW,
    biasing: bool,
    steps: usize,
}

impl ProbeTrainer {
    /// Create a trainer over the metric's probe parameters. With `biasing`
    /// the policy's trainable parameters are optimised as well.
    pub fn new<P>(
        metric: &GoalOrderingPredictionMetric<P>,
        config: &MetricConfig,
        biasing: bool,
    ) -> Result<Self>
    where
        P: HiddenStatePolicy + Clone,
    {
        config.validate()?;
        let mut vars = metric.probe().vars();
        if biasing {
            vars.extend(metric.policy().trainable_vars());
        }
        debug!("optimising {} parameter tensors (biasing: {biasing})", vars.len());

        let optimizer = AdamW::new(
            vars,
            ParamsAdamW {
                lr: config.learning_rate,
                weight_decay: config.weight_decay,
                ..Default::default()
            },
        )?;

        Ok(Self {
            optimizer,
            biasing,
            steps: 0,
        })
    }

    pub fn biasing(&self) -> bool {
        self.biasing
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn set_learning_rate(&mut self, lr: f64) {
        self.optimizer.set_learning_rate(lr);
    }

    /// Evaluate the metric on `batch`, back-propagate and update parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBatch`] for a batch without actors, and any error
    /// raised by the metric or the optimiser.
    pub fn step<P>(
        &mut self,
        metric: &mut GoalOrderingPredictionMetric<P>,
        batch: &ProbeBatch<P::Observation>,
    ) -> Result<(StepLosses, GoalOrderingPredictionOutput)>
    where
        P: HiddenStatePolicy + Clone,
    {
        if batch.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let output = metric.evaluate(batch, self.biasing)?;
        let l_gop = output.l_gop.mean_all()?;
        let l_rp = output.l_rp.mean_all()?;
        let total = (&l_gop + &l_rp)?;
        self.optimizer.backward_step(&total)?;
        self.steps += 1;

        let losses = StepLosses {
            l_gop: l_gop.to_scalar::<f32>()? as f64,
            l_rp: l_rp.to_scalar::<f32>()? as f64,
            total: total.to_scalar::<f32>()? as f64,
        };
        debug!(
            "step {}: l_gop {:.4}, l_rp {:.4}",
            self.steps, losses.l_gop, losses.l_rp
        );
        Ok((losses, output))
    }
}
