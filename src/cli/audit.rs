use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gsa::{Directory, storage::AuditIssue};
use serde::Serialize;
use tracing::instrument;

use super::{list::OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Audit {
    /// Also report legacy assets that have no code yet
    #[arg(long)]
    all: bool,

    /// Output format (default: table)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Finding {
    kind: &'static str,
    category: &'static str,
    message: String,
}

impl From<&AuditIssue> for Finding {
    fn from(issue: &AuditIssue) -> Self {
        Self {
            kind: issue.kind(),
            category: issue.category().as_str(),
            message: issue.to_string(),
        }
    }
}

impl Audit {
    /// Exits with code 2 if the registry has problems.
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);
        let report = directory.audit();

        let findings: Vec<Finding> = report
            .issues
            .iter()
            .filter(|issue| self.all || issue.is_problem())
            .map(Finding::from)
            .collect();
        let problems = report.problems().count();

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &findings)
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Table => {
                for finding in &findings {
                    let marker = if finding.kind == "missing_code" {
                        "•".dim()
                    } else {
                        "❌".warning()
                    };
                    println!("{marker} {}", finding.message);
                }
                if problems == 0 {
                    println!(
                        "{} {} assets scanned, no problems found",
                        "✅".success(),
                        report.scanned
                    );
                } else {
                    println!();
                    println!(
                        "{}",
                        format!("{problems} problems in {} assets", report.scanned).warning()
                    );
                }
            }
        }

        if problems > 0 {
            std::process::exit(2);
        }
        Ok(())
    }
}
