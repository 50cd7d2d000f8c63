//! Drive CLI Binary
//!
//! Command-line interface for uploading, retrieving and browsing drive items.

use clap::Parser;
use drive::logging::init_logging;
use drive::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let config = match CliContext::load_config(&cli.workspace, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let logging = cli.logging_config(&config.logging);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    // Create CLI context
    let context = match CliContext::from_config(cli.workspace.clone(), config, cli.owner.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing session: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
