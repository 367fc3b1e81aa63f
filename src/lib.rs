pub mod backup;
pub mod commands;
pub mod config;
pub mod error;
pub mod filename_utils;
pub mod frontend;
pub mod fs;
pub mod mount;
pub mod save_paths;

#[cfg(test)]
mod testing;

use clap::Parser;
use commands::Cli;
use std::process::ExitCode;

/// Runs the command line entry point.
pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = config::load_initial_config(cli.config.as_deref());
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    match commands::dispatch(&cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
