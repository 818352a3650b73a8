//! comaze-probe CLI - goal ordering and rule prediction probes
//!
//! This CLI provides:
//! - A synthetic end-to-end run of the probe metric
//! - Inspection of the metric configuration

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "comaze-probe")]
#[command(
    version,
    about = "Probe recurrent agents for goal ordering and rule beliefs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a probe on synthetic episodes and report the metric
    Demo(comaze_probe::cli::commands::demo::DemoArgs),

    /// Print the effective metric configuration
    Config(comaze_probe::cli::commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo(args) => comaze_probe::cli::commands::demo::execute(args),
        Commands::Config(args) => comaze_probe::cli::commands::config::execute(args),
    }
}
