//! Generate man page command

use anyhow::{Context, Result};
use clap::CommandFactory;
use std::fs;

use super::GenerateManArgs;
use crate::cli::{exit_codes, Cli};

/// Execute the generate-man command
pub async fn execute(args: GenerateManArgs) -> Result<i32> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);

    let output_path = args.output.join("fixlens.1");

    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)
        .context("Failed to generate man page")?;

    fs::write(&output_path, buffer)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("Man page generated: {}", output_path.display());

    Ok(exit_codes::SUCCESS)
}
