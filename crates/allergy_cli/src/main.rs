//! Command-line front end for the allergy store.
//!
//! # Responsibility
//! - Parse commands and hand them to `allergy_core` through an explicit service.
//! - Own all user-facing wording for results and failures.

mod commands;

use allergy_core::{init_logging, AppConfig};
use clap::Parser;
use commands::{Cli, CommandError};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.resolve_config(AppConfig::from_env());

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    let mut stdout = std::io::stdout().lock();
    match commands::run(&cli.command, &config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(message)) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
