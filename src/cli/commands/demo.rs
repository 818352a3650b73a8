//! Demo command - Train a probe on synthetic episodes and report the metric

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use log::info;

use crate::{
    adapters::RecurrentPolicy,
    cli::{
        output::{create_epoch_progress, print_kv, print_report, print_section},
        synthetic::{SYNTHETIC_OBS_DIM, SyntheticEpisodes},
    },
    config::MetricConfig,
    export::ReportExporter,
    metric::GoalOrderingPredictionMetric,
    training::ProbeTrainer,
};

#[derive(Parser, Debug)]
#[command(about = "Train a goal ordering probe on synthetic episodes")]
pub struct DemoArgs {
    /// Number of actors in the batch
    #[arg(long, short = 'a', default_value_t = 8)]
    pub actors: usize,

    /// Timesteps per actor trajectory
    #[arg(long, short = 't', default_value_t = 20)]
    pub timesteps: usize,

    /// Probe training epochs over the batch
    #[arg(long, short = 'e', default_value_t = 100)]
    pub epochs: usize,

    /// Hidden state width of the recurrent policy
    #[arg(long, default_value_t = 64)]
    pub policy_hidden: usize,

    /// Observation noise half-width
    #[arg(long, default_value_t = 0.5)]
    pub noise: f32,

    /// Back-propagate the probe loss into the policy
    #[arg(long)]
    pub biasing: bool,

    /// Random seed for the synthetic episodes
    #[arg(long)]
    pub seed: Option<u64>,

    /// Metric configuration file (JSON)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Override the probe hidden layer width
    #[arg(long)]
    pub hidden_units: Option<usize>,

    /// Override the learning rate
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Write the final report as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the final per-actor report as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn execute(args: DemoArgs) -> Result<()> {
    if args.actors == 0 || args.timesteps == 0 {
        bail!("--actors and --timesteps must both be at least 1");
    }
    if !(args.noise.is_finite() && args.noise >= 0.0) {
        bail!("--noise must be finite and non-negative, got {}", args.noise);
    }

    let mut config = match &args.config {
        Some(path) => MetricConfig::from_json_file(path)?,
        None => MetricConfig::new(),
    };
    if let Some(hidden_units) = args.hidden_units {
        config = config.with_hidden_units(hidden_units);
    }
    if let Some(lr) = args.learning_rate {
        config = config.with_learning_rate(lr);
    }
    config.validate()?;

    let device = config.device.device()?;
    let mut episodes =
        SyntheticEpisodes::new(args.actors, args.timesteps).with_noise(args.noise);
    if let Some(seed) = args.seed {
        episodes = episodes.with_seed(seed);
    }
    let batch = episodes.generate()?;

    let policy = RecurrentPolicy::new(SYNTHETIC_OBS_DIM, args.policy_hidden, args.actors, &device)?;
    let mut metric = GoalOrderingPredictionMetric::new(policy, &config)?;
    let mut trainer = ProbeTrainer::new(&metric, &config, args.biasing)?;

    print_section("Goal ordering prediction demo");
    print_kv("actors", &args.actors.to_string());
    print_kv("timesteps", &args.timesteps.to_string());
    print_kv("probe", &metric.probe().to_string());
    print_kv("biasing", &args.biasing.to_string());

    let progress = if args.no_progress {
        None
    } else {
        Some(create_epoch_progress(args.epochs as u64)?)
    };

    for epoch in 0..args.epochs {
        let (losses, output) = trainer.step(&mut metric, &batch)?;
        if let Some(pb) = &progress {
            pb.set_position(epoch as u64 + 1);
            pb.set_message(format!("loss {:.3}", losses.total));
        }
        if (epoch + 1) % 10 == 0 {
            let report = output.report()?;
            info!(
                "epoch {}: loss {:.4}, gop {:.1}%, rp {:.1}%",
                epoch + 1,
                losses.total,
                report.summary.gop_accuracy.mean,
                report.summary.rp_accuracy.mean
            );
        }
    }
    if let Some(pb) = &progress {
        pb.finish_with_message("done");
    }

    let report = metric.evaluate(&batch, false)?.report()?;
    print_section("Final evaluation");
    print_report(&report);

    if let Some(path) = &args.json {
        ReportExporter::write_json(&report, path)?;
        println!("\nReport written to {}", path.display());
    }
    if let Some(path) = &args.csv {
        ReportExporter::write_csv(&report, path)?;
        println!("Per-actor CSV written to {}", path.display());
    }

    Ok(())
}
