//! # CLI Module
//!
//! This module defines the command-line interface for fixlens using `clap`.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Initialize a new configuration file |
//! | `scan` | Report issues without modifying anything |
//! | `fix` | Repair issues in place, keeping a backup of each modified file |
//!
//! ## Global Options
//!
//! - `-v, --verbose` - Increase verbosity level (use multiple times: -v, -vv, -vvv)
//! - `-c, --config <FILE>` - Path to configuration file
//! - `-C, --directory <DIR>` - Working directory (defaults to current directory)
//!
//! ## Examples
//!
//! ```bash
//! # Initialize configuration
//! fixlens init --preset strict
//!
//! # List issues as JSON
//! fixlens scan src --format json -o issues.json
//!
//! # Preview, then apply
//! fixlens fix --dry-run
//! fixlens fix --yes
//! ```

pub mod commands;
pub mod exit_codes;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{FixArgs, GenerateManArgs, InitArgs, ScanArgs};

/// fixlens - Detect and repair common defects across multi-language source trees
#[derive(Parser, Debug)]
#[command(name = "fixlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(InitArgs),

    /// Report issues without modifying any file
    Scan(ScanArgs),

    /// Repair issues in place
    Fix(FixArgs),

    /// Generate man page (hidden, for packaging)
    #[command(hide = true)]
    GenerateMan(GenerateManArgs),
}
