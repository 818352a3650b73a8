//! Per-actor trajectories fed to the metric

use crate::types::{GoalOrderingLabels, RuleLabels};

/// A batch of per-actor trajectories with their ground-truth labels.
///
/// `masks`, when present, holds one weight per timestep for every actor.
#[derive(Debug, Clone)]
pub struct ProbeBatch<O> {
    pub observations: Vec<Vec<O>>,
    pub goal_orderings: Vec<GoalOrderingLabels>,
    pub rules: Vec<RuleLabels>,
    pub masks: Option<Vec<Vec<f32>>>,
}

impl<O> ProbeBatch<O> {
    pub fn new() -> Self {
        Self {
            observations: Vec::new(),
            goal_orderings: Vec::new(),
            rules: Vec::new(),
            masks: None,
        }
    }

    /// Add an actor whose every timestep is valid.
    pub fn push_actor(
        &mut self,
        observations: Vec<O>,
        goal_ordering: GoalOrderingLabels,
        rules: RuleLabels,
    ) {
        if let Some(masks) = &mut self.masks {
            masks.push(vec![1.0; observations.len()]);
        }
        self.observations.push(observations);
        self.goal_orderings.push(goal_ordering);
        self.rules.push(rules);
    }

    /// Add an actor with an explicit per-timestep mask. Actors pushed earlier
    /// without a mask are treated as fully valid.
    pub fn push_masked_actor(
        &mut self,
        observations: Vec<O>,
        goal_ordering: GoalOrderingLabels,
        rules: RuleLabels,
        mask: Vec<f32>,
    ) {
        let earlier = &self.observations;
        self.masks
            .get_or_insert_with(|| earlier.iter().map(|obs| vec![1.0; obs.len()]).collect())
            .push(mask);
        self.observations.push(observations);
        self.goal_orderings.push(goal_ordering);
        self.rules.push(rules);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Total number of timesteps across actors.
    pub fn timesteps(&self) -> usize {
        self.observations.iter().map(Vec::len).sum()
    }
}

impl<O> Default for ProbeBatch<O> {
    fn default() -> Self {
        Self::new()
    }
}
