//! kfdeck CLI: batch KeyForge deck reports.
//!
//! Reads a file of deck links and writes one report block per deck, combining
//! data from KeyForge Compendium, Decks of KeyForge and KeyForgeGame.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
