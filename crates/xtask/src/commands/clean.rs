//! Clean save data and logs command
//!
//! Removes the engine's persistent data:
//! - Logs (cache directory)
//! - Save slots (save directory, or a single slot)
//!
//! Always prompts for confirmation before deletion unless `--yes` is given.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use echoes_runtime::{FileSaveRepository, SaveRepository};

use crate::dirs;

/// Clean save data and logs
#[derive(Parser, Debug)]
pub struct Clean {
    /// Clean only logs (cache directory)
    #[arg(long)]
    pub logs: bool,

    /// Clean only save data
    #[arg(long)]
    pub saves: bool,

    /// Delete a single save slot instead of the whole save directory
    #[arg(long, value_name = "SLOT", conflicts_with = "logs")]
    pub slot: Option<String>,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

enum Target {
    Directory(String, PathBuf),
    Slot(String),
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        // If no flags specified, clean both
        let clean_logs = self.logs || (!self.saves && self.slot.is_none());
        let clean_saves = self.saves || self.slot.is_some() || !self.logs;

        let save_dir = dirs::save_dir();
        let mut targets = Vec::new();

        if clean_logs {
            let log_dir = dirs::log_dir();
            if log_dir.exists() {
                targets.push(Target::Directory("All logs".to_string(), log_dir));
            }
        }

        if clean_saves {
            match &self.slot {
                Some(slot) => {
                    let repo = FileSaveRepository::new(&save_dir)?;
                    if !repo.exists(slot) {
                        eprintln!(
                            "{} Save slot not found: {}",
                            style("✗").red().bold(),
                            style(slot).cyan()
                        );
                        anyhow::bail!("Save slot does not exist");
                    }
                    targets.push(Target::Slot(slot.clone()));
                }
                None if save_dir.exists() => {
                    targets.push(Target::Directory("Save data".to_string(), save_dir.clone()));
                }
                None => {}
            }
        }

        if targets.is_empty() {
            println!(
                "{}",
                style("Nothing to clean - directories don't exist yet").dim()
            );
            return Ok(());
        }

        println!("{}", style("🧹 Clean Shadow Echoes Data").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for target in &targets {
            let (label, path) = match target {
                Target::Directory(label, path) => (label.clone(), path.clone()),
                Target::Slot(slot) => (
                    format!("Save slot ({})", slot),
                    FileSaveRepository::new(&save_dir)?.save_path(slot)?,
                ),
            };
            println!("  {} {}", style("→").cyan(), style(label).bold());
            println!("    {}", style(path.display()).dim());
        }
        println!();

        if !self.yes && !confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for target in targets {
            match target {
                Target::Directory(label, path) => {
                    print!("Deleting {}... ", label);
                    io::stdout().flush()?;
                    std::fs::remove_dir_all(&path)
                        .with_context(|| format!("Failed to delete: {}", path.display()))?;
                }
                Target::Slot(slot) => {
                    print!("Deleting slot {}... ", slot);
                    io::stdout().flush()?;
                    FileSaveRepository::new(&save_dir)?
                        .delete(&slot)
                        .with_context(|| format!("Failed to delete slot '{}'", slot))?;
                }
            }
            println!("{}", style("✓").green());
        }

        println!();
        println!("{}", style("✓ Cleanup complete!").green().bold());

        Ok(())
    }
}

/// Prompt user for confirmation
fn confirm() -> Result<bool> {
    print!("{} ", style("Proceed? [y/N]").yellow().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
