//! Init command - Initialize a new configuration file

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Select};
use std::fs;
use std::path::Path;

use super::InitArgs;
use crate::cli::exit_codes;
use crate::config::loader::CONFIG_FILENAME;
use crate::config::{Config, Preset};

pub async fn execute(args: InitArgs) -> Result<i32> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        if args.non_interactive {
            eprintln!(
                "{} Configuration file already exists. Use --force to overwrite.",
                "Error:".red().bold()
            );
            return Ok(exit_codes::ERROR);
        }

        let overwrite = Confirm::new()
            .with_prompt("Configuration file already exists. Overwrite?")
            .default(false)
            .interact()?;

        if !overwrite {
            println!("{}", "Aborted.".yellow());
            return Ok(exit_codes::SUCCESS);
        }
    }

    let preset = if let Some(preset_name) = args.preset {
        match Preset::from_name(&preset_name) {
            Some(preset) => preset,
            None => {
                eprintln!(
                    "{} Unknown preset '{}'. Valid presets: minimal, standard, strict",
                    "Error:".red().bold(),
                    preset_name
                );
                return Ok(exit_codes::INVALID_ARGS);
            }
        }
    } else if args.non_interactive {
        Preset::Standard
    } else {
        select_preset()?
    };

    let config = Config::from_preset(preset);
    let config_content = config.to_toml()?;
    fs::write(config_path, &config_content).context("Failed to write configuration file")?;

    println!(
        "{} Created {} with preset '{}'",
        "Success:".green().bold(),
        CONFIG_FILENAME.cyan(),
        preset.name().yellow()
    );

    println!("\nNext steps:");
    println!("  1. Review and customize {}", CONFIG_FILENAME.cyan());
    println!("  2. Run {} to list issues", "fixlens scan".cyan());
    println!("  3. Run {} to repair them", "fixlens fix".cyan());

    Ok(exit_codes::SUCCESS)
}

fn select_preset() -> Result<Preset> {
    let presets = Preset::all();
    let items: Vec<String> = presets
        .iter()
        .map(|p| format!("{} - {}", p.name(), p.description()))
        .collect();

    let selection = Select::new()
        .with_prompt("Select a preset")
        .items(&items)
        .default(1)
        .interact()?;

    Ok(presets.get(selection).copied().unwrap_or(Preset::Standard))
}
