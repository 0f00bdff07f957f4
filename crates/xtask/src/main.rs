//! Development tasks for the timeline engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadSave, Simulate};

/// Development tasks for the timeline engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for Shadow Echoes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scripted session and print modifiers frame by frame
    Simulate(Simulate),

    /// Read and inspect a save slot
    ReadSave(ReadSave),

    /// Clean save data and logs
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for ECHOES_* and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(cmd) => cmd.execute(),
        Command::ReadSave(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
