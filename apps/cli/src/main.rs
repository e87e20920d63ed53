//! roamgraph CLI — render the `Depends On::` graph of an outline block.
//!
//! Reads a Roam JSON export, follows block references from a root block,
//! and writes a Mermaid flowchart back under that block.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
