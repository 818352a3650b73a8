//! Common test utilities for the comaze-probe test suite.
//!
//! This module provides a scripted policy whose hidden state is its
//! observation, and an identity-weighted probe, so that predictions and losses
//! can be computed by hand.

#![allow(dead_code)]

use candle_core::{DType, Device, Tensor};
use comaze_probe::{
    Error, GoalOrderingLabels, GoalOrderingPredictionMetric, HiddenStatePolicy, MetricConfig,
    Result, RuleLabels,
    types::{LABEL_DIM, NUM_ORDER_CLASSES, NUM_RULE_CLASSES, ORDERING_LABEL_DIM},
};

/// Policy returning each observation unchanged as its hidden state.
///
/// Its "inner state" is the number of steps taken since the last reset, and
/// every reset is logged so tests can check the metric's bookkeeping.
#[derive(Debug, Clone)]
pub struct ScriptedPolicy {
    pub nbr_actors: usize,
    pub steps: usize,
    pub saved: Option<usize>,
    pub resets: Vec<(usize, bool)>,
}

impl ScriptedPolicy {
    pub fn new(nbr_actors: usize) -> Self {
        Self {
            nbr_actors,
            steps: 0,
            saved: None,
            resets: Vec::new(),
        }
    }
}

impl HiddenStatePolicy for ScriptedPolicy {
    type Observation = Vec<f32>;

    fn hidden_state_dim(&self) -> usize {
        LABEL_DIM
    }

    fn nbr_actors(&self) -> usize {
        self.nbr_actors
    }

    fn reset(&mut self, nbr_actors: usize, training: bool) -> Result<()> {
        self.steps = 0;
        self.resets.push((nbr_actors, training));
        Ok(())
    }

    fn save_inner_state(&mut self) -> Result<()> {
        self.saved = Some(self.steps);
        Ok(())
    }

    fn restore_inner_state(&mut self) -> Result<()> {
        self.steps = self.saved.take().ok_or(Error::NoSavedInnerState)?;
        Ok(())
    }

    fn hidden_state(&mut self, observation: &Vec<f32>) -> Result<Tensor> {
        if observation.len() != LABEL_DIM {
            return Err(Error::ObservationShape {
                expected: LABEL_DIM,
                got: observation.len(),
            });
        }
        self.steps += 1;
        Ok(Tensor::from_slice(observation.as_slice(), (1, LABEL_DIM), &Device::Cpu)?)
    }
}

/// Metric whose probe computes `logits = relu(hidden_state)`.
pub fn identity_metric(policy: ScriptedPolicy) -> GoalOrderingPredictionMetric<ScriptedPolicy> {
    let config = MetricConfig::new().with_hidden_units(LABEL_DIM);
    let metric = GoalOrderingPredictionMetric::new(policy, &config).unwrap();

    let device = Device::Cpu;
    let identity: Vec<f32> = (0..LABEL_DIM * LABEL_DIM)
        .map(|i| if i / LABEL_DIM == i % LABEL_DIM { 1.0 } else { 0.0 })
        .collect();
    let eye = Tensor::from_vec(identity, (LABEL_DIM, LABEL_DIM), &device).unwrap();
    let zeros = Tensor::zeros(LABEL_DIM, DType::F32, &device).unwrap();
    let mut varmap = metric.probe().varmap().clone();
    varmap.set_one("hidden.weight", &eye).unwrap();
    varmap.set_one("hidden.bias", &zeros).unwrap();
    varmap.set_one("output.weight", &eye).unwrap();
    varmap.set_one("output.bias", &zeros).unwrap();
    metric
}

/// Observation that makes the identity probe predict `goals` and `rules`
/// with logit `strength` on each predicted class and zero elsewhere.
pub fn encode_prediction(goals: [u32; 4], rules: [u32; 4], strength: f32) -> Vec<f32> {
    let mut obs = vec![0.0; LABEL_DIM];
    for (goal, &class) in goals.iter().enumerate() {
        obs[goal * NUM_ORDER_CLASSES + class as usize] = strength;
    }
    for (rule, &class) in rules.iter().enumerate() {
        obs[ORDERING_LABEL_DIM + rule * NUM_RULE_CLASSES + class as usize] = strength;
    }
    obs
}

pub fn goal_labels(values: [u32; 4]) -> GoalOrderingLabels {
    GoalOrderingLabels::new(values).unwrap()
}

pub fn rule_labels(values: [u32; 4]) -> RuleLabels {
    RuleLabels::new(values).unwrap()
}

/// NLL of a class with logit `strength` against `classes - 1` zero logits.
pub fn nll_correct(strength: f32, classes: usize) -> f32 {
    (strength.exp() + (classes - 1) as f32).ln() - strength
}

/// NLL of a zero-logit class when another class has logit `strength`.
pub fn nll_wrong(strength: f32, classes: usize) -> f32 {
    (strength.exp() + (classes - 1) as f32).ln()
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
