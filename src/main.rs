//! Command-line interface for GSA asset codes and the asset registry.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
