//! Goal ordering and rule prediction probes for CoMaze agents
//!
//! This crate provides:
//! - A hidden-state policy port for recurrent agents, with an Elman RNN adapter
//! - A linear-ReLU-linear probe predicting goal reach ordering and rule assignments
//! - The goal ordering prediction metric: masked per-actor losses, accuracies
//!   and quartiles of the fully-correct timesteps, in frozen or biasing mode
//! - An AdamW trainer for the probe, JSON/CSV report export and a demo CLI

pub mod adapters;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod metric;
pub mod ports;
pub mod probe;
pub mod training;
pub mod types;

pub use analysis::CorrectIndexStats;
pub use config::MetricConfig;
pub use error::{Error, Result};
pub use metric::{
    GoalOrderingPredictionMetric, GoalOrderingPredictionOutput, MetricReport, ProbeBatch,
};
pub use ports::HiddenStatePolicy;
pub use training::{ProbeTrainer, StepLosses};
pub use types::{GoalOrderingLabels, RuleLabels};
