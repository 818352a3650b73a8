//! Seeded synthetic CoMaze-like episodes for the demo command.
//!
//! Each actor gets random goal ordering and rule labels. Its observation at
//! step `t` is the one-hot encoding of those labels scaled by `(t + 1) / T`
//! plus uniform noise, so the labels become easier to read as the episode
//! progresses. Episodes end at a random length between `T / 2` and `T`; the
//! remaining steps carry zero observations and a zero mask.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Error, Result,
    metric::ProbeBatch,
    types::{
        GoalOrderingLabels, LABEL_DIM, NUM_GOALS, NUM_ORDER_CLASSES, NUM_RULE_CLASSES, NUM_RULES,
        ORDERING_LABEL_DIM, RuleLabels,
    },
};

/// Observation width of synthetic episodes.
pub const SYNTHETIC_OBS_DIM: usize = LABEL_DIM;

#[derive(Debug, Clone)]
pub struct SyntheticEpisodes {
    pub actors: usize,
    pub timesteps: usize,
    /// Half-width of the uniform noise added to every observation value
    pub noise: f32,
    pub seed: Option<u64>,
}

impl SyntheticEpisodes {
    pub fn new(actors: usize, timesteps: usize) -> Self {
        Self {
            actors,
            timesteps,
            noise: 0.5,
            seed: None,
        }
    }

    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate the batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the noise is negative or
    /// not finite.
    pub fn generate(&self) -> Result<ProbeBatch<Vec<f32>>> {
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("noise must be finite and non-negative, got {}", self.noise),
            });
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut batch = ProbeBatch::new();
        for _ in 0..self.actors {
            let goals: [u32; NUM_GOALS] =
                std::array::from_fn(|_| rng.random_range(0..NUM_ORDER_CLASSES as u32));
            let rules: [u32; NUM_RULES] =
                std::array::from_fn(|_| rng.random_range(0..NUM_RULE_CLASSES as u32));
            let goal_labels = GoalOrderingLabels::new(goals)?;
            let rule_labels = RuleLabels::new(rules)?;

            let length = rng.random_range(self.timesteps.div_ceil(2)..=self.timesteps);
            let mut observations = Vec::with_capacity(self.timesteps);
            let mut mask = Vec::with_capacity(self.timesteps);

            for t in 0..self.timesteps {
                if t >= length {
                    observations.push(vec![0.0; SYNTHETIC_OBS_DIM]);
                    mask.push(0.0);
                    continue;
                }

                let signal = (t + 1) as f32 / length as f32;
                let mut obs: Vec<f32> = (0..SYNTHETIC_OBS_DIM)
                    .map(|_| rng.random_range(-self.noise..=self.noise))
                    .collect();
                for (goal, &class) in goals.iter().enumerate() {
                    obs[goal * NUM_ORDER_CLASSES + class as usize] += signal;
                }
                for (rule, &class) in rules.iter().enumerate() {
                    obs[ORDERING_LABEL_DIM + rule * NUM_RULE_CLASSES + class as usize] += signal;
                }
                observations.push(obs);
                mask.push(1.0);
            }

            batch.push_masked_actor(observations, goal_labels, rule_labels, mask);
        }
        Ok(batch)
    }
}
