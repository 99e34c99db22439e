use clap::Parser;
use colored::Colorize;
use rust_coach_eta::commands::{CommandError, Operation};
use rust_coach_eta::config::AppConfig;
use std::path::PathBuf;

/// Projects coach arrival times from a published timetable and live traffic estimates.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CoachEtaApp {
    /// TOML configuration file; built-in defaults if omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    op: Operation,
}

fn main() {
    env_logger::init();
    let args = CoachEtaApp::parse();
    let result = AppConfig::load(args.config.as_deref())
        .map_err(CommandError::from)
        .and_then(|config| args.op.run(&config));
    if let Err(e) = result {
        eprintln!("{} {}", "ERROR:".red().bold(), e);
        std::process::exit(1);
    }
}
