//! Config command - Print the effective metric configuration as JSON

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::MetricConfig;

#[derive(Parser, Debug)]
#[command(about = "Print the metric configuration")]
pub struct ConfigArgs {
    /// Configuration file to load and validate (defaults are printed otherwise)
    pub path: Option<PathBuf>,
}

pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = match &args.path {
        Some(path) => MetricConfig::from_json_file(path)?,
        None => MetricConfig::default(),
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
