//! fixlens - Detect and repair common code defects across multi-language source trees
//!
//! This is the main entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fixlens::cli::{commands, exit_codes, Cli, Commands};
use fixlens::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(exit_codes::ERROR);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
    }

    let config_path = cli.config;
    match cli.command {
        Commands::Init(args) => commands::init::execute(args).await,
        Commands::Scan(args) => {
            let config = load_config(config_path.as_deref())?;
            commands::scan::execute(args, &config).await
        }
        Commands::Fix(args) => {
            let config = load_config(config_path.as_deref())?;
            commands::fix::execute(args, &config).await
        }
        Commands::GenerateMan(args) => commands::generate_man::execute(args).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load configuration")
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
