use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use gsa::{AssetCategory, Directory};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
pub struct Transfer {
    /// Asset category (vehicle, equipment, furniture)
    category: AssetCategory,

    /// Id of the asset to transfer
    id: String,

    /// Full name of the receiving ministry, agency or commission
    department: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Transfer {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);

        if !self.yes {
            let proceed = Confirm::new()
                .with_prompt(format!(
                    "Transfer {} {} to '{}'? Its current code will be retired",
                    self.category, self.id, self.department
                ))
                .default(false)
                .interact()?;
            if !proceed {
                println!("Cancelled");
                std::process::exit(130);
            }
        }

        let transfer = directory
            .transfer(self.category, &self.id, &self.department)
            .with_context(|| format!("failed to transfer {} {}", self.category, self.id))?;

        println!(
            "{} {} {} → {}",
            "✅".success(),
            transfer.id,
            transfer.previous_department.dim(),
            self.department
        );
        match transfer.previous_code {
            Some(previous) => println!("   {} → {}", previous.dim(), transfer.code.info()),
            None => println!("   {}", transfer.code.info()),
        }

        Ok(())
    }
}
