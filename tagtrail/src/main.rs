mod analyze;
mod cli;

use clap::Parser;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    TermLogger::init(
        cli.loglevel,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("Failed to initialize logger");

    let result = match cli.command {
        Commands::Stats(args) => analyze::run_stats(args),
        Commands::Exposure(args) => analyze::run_exposure(args),
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
