use clap::{Parser, Subcommand};
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Log level for output (error, warn, info, debug, trace)
    #[arg(global = true, long, default_value = "info")]
    pub loglevel: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a collection session
    Stats(StatsArgs),

    /// Measure tracking exposure under an address-rotation model
    Exposure(ExposureArgs),
}

#[derive(Parser)]
pub struct StatsArgs {
    /// Aggregate csv file with the captured rows
    pub datafile: PathBuf,
}

#[derive(Parser)]
pub struct ExposureArgs {
    /// Aggregate csv file with the captured rows
    pub datafile: PathBuf,

    /// Modeled address-rotation interval in seconds
    #[arg(short = 'e', long, default_value = "4.0")]
    pub epoch_length: f64,

    /// Minimum repeat count for a noise point to count as a tracked device
    #[arg(short = 'p', long, default_value = "0")]
    pub prefiltering_minimum: usize,
}
