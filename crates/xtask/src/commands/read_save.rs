//! Read and inspect save slots from the persistence layer
//!
//! Opens `save_{slot}.bin`, verifies the envelope and displays the session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use echoes_core::Timeline;
use echoes_runtime::{FileSaveRepository, SessionSnapshot};

use crate::dirs;

/// Read and inspect a save slot
#[derive(Parser)]
pub struct ReadSave {
    /// Slot to read (e.g., quick, slot1)
    #[arg(value_name = "SLOT")]
    slot: String,

    /// Custom save directory (defaults to ECHOES_SAVE_DIR or the platform data directory)
    #[arg(short, long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (timeline, roster, kit state)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadSave {
    pub fn execute(self) -> Result<()> {
        let save_dir = self.save_dir.unwrap_or_else(dirs::save_dir);
        let repo = FileSaveRepository::new(&save_dir)
            .with_context(|| format!("Failed to open save directory: {}", save_dir.display()))?;
        let path = repo.save_path(&self.slot)?;

        let Some(envelope) = repo
            .read_envelope(&self.slot)
            .with_context(|| format!("Failed to read save file: {}", path.display()))?
        else {
            anyhow::bail!(
                "Save slot not found: {}\n\nHint: Check available slots in {}",
                path.display(),
                save_dir.display()
            );
        };
        let snapshot = envelope
            .open(&self.slot)
            .with_context(|| format!("Failed to decode save file: {}", path.display()))?;

        // Print header
        println!("{} {}", style("Save File:").bold().cyan(), path.display());
        println!(
            "{} {}",
            style("Payload Size:").bold().cyan(),
            format_bytes(envelope.payload.len())
        );
        println!("{} {}", style("Version:").bold().cyan(), envelope.version);
        println!("{} {}", style("SHA-256:").bold().cyan(), envelope.digest_hex());
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&snapshot),
            OutputFormat::Json => print_json(&snapshot)?,
            OutputFormat::Debug => println!("{:#?}", snapshot),
        }

        Ok(())
    }
}

fn print_summary(snapshot: &SessionSnapshot) {
    println!("{}", style("=== Session Summary ===").bold().green());
    println!();

    let timeline = &snapshot.timeline;
    println!("{}", style("Timeline:").bold().yellow());
    println!("  Session: {}", snapshot.session_id);
    println!("  Current: {}", timeline.current);
    println!("  Energy: {:.1} / {:.1}", timeline.energy, timeline.max_energy);
    println!(
        "  Mastery: bright {:.3}, dark {:.3}",
        timeline.mastery.get(Timeline::BrightWorld),
        timeline.mastery.get(Timeline::DarkWorld)
    );
    match timeline.transition {
        Some(transition) => println!(
            "  Transition: → {} ({:.0}%)",
            transition.target,
            transition.progress * 100.0
        ),
        None => println!("  Transition: none"),
    }
    println!();

    println!(
        "{} {}",
        style("Characters:").bold().yellow(),
        snapshot.characters.len()
    );
    for character in &snapshot.characters {
        println!(
            "  {} {} ({}, level {}, {})",
            style(character.id).dim(),
            style(&character.name).bold(),
            character.kit.kind(),
            character.sheet.level(),
            character.sheet.specialization()
        );
        println!(
            "    health {:.1} / {:.1}, energy {:.1} / {:.1}",
            character.vitals.health.current(),
            character.vitals.health.maximum(),
            character.vitals.energy.current(),
            character.vitals.energy.maximum()
        );
    }
}

fn print_json(snapshot: &SessionSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
