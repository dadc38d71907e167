mod cli;
mod config;
mod error;
mod series;

use std::process::ExitCode;

use clap::Parser;
use cli::{command, Cli, Commands, TerminalSelector};
use config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut selector = TerminalSelector;

    match &cli.command {
        Commands::Resample {} => match command::resample(&config, &mut selector) {
            Ok(filename) => println!("File saved to `{}`", filename.display()),
            Err(e) if e.is_cancelled() => println!("Cancelled"),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Commands::Interval {} => match command::interval(&config, &mut selector) {
            Ok(_) => {}
            Err(e) if e.is_cancelled() => println!("Cancelled"),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Commands::Format(args) => match command::format(args, &config, &mut selector) {
            Ok(Some(filename)) => println!("File saved to `{}`", filename.display()),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return ExitCode::FAILURE;
            }
        },
        Commands::Columns { file } => match command::columns(&config, file) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}
