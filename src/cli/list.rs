use std::{fmt, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gsa::{AssetCategory, AssetRecord, Directory};
use serde::{Serialize, Serializer};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

/// Command arguments for `gsa list`.
#[derive(Debug, Parser)]
pub struct List {
    /// Only list this category (default: all)
    category: Option<AssetCategory>,

    /// Only list assets owned by this department (case-insensitive)
    #[arg(long, short)]
    department: Option<String>,

    /// Only list assets without a GSA code
    #[arg(long)]
    uncoded: bool,

    /// Output format (default: table)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    #[serde(serialize_with = "serialize_category")]
    category: AssetCategory,
    #[serde(flatten)]
    record: &'a AssetRecord,
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);

        let categories = self
            .category
            .map_or_else(|| AssetCategory::ALL.to_vec(), |category| vec![category]);

        let mut collections = Vec::with_capacity(categories.len());
        for category in categories {
            let records = directory
                .load(category)
                .with_context(|| format!("failed to load {}", category.collection()))?;
            collections.push((category, records));
        }

        let rows: Vec<Row<'_>> = collections
            .iter()
            .flat_map(|(category, records)| {
                records.iter().map(|record| Row {
                    category: *category,
                    record,
                })
            })
            .filter(|row| self.matches(row.record))
            .collect();

        match self.output {
            OutputFormat::Table => render_table(&rows),
            OutputFormat::Json => render_json(&rows)?,
        }
        Ok(())
    }

    fn matches(&self, record: &AssetRecord) -> bool {
        if self.uncoded && record.code().is_some() {
            return false;
        }
        self.department
            .as_ref()
            .is_none_or(|department| record.department.eq_ignore_ascii_case(department))
    }
}

fn render_table(rows: &[Row<'_>]) {
    if rows.is_empty() {
        println!("{}", "No assets found".dim());
        return;
    }

    let narrow = is_narrow();
    let headers: &[&str] = if narrow {
        &["CODE", "ID"]
    } else {
        &["CODE", "CATEGORY", "CLASS", "DEPARTMENT", "ID"]
    };

    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let code = row.record.code().unwrap_or("-").to_string();
            if narrow {
                vec![code, row.record.id.clone()]
            } else {
                vec![
                    code,
                    row.category.to_string(),
                    row.record.class_label(row.category).to_string(),
                    row.record.department.clone(),
                    row.record.id.clone(),
                ]
            }
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in data {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }

    println!();
    println!("{}", format!("{} assets", rows.len()).dim());
}

fn serialize_category<S: Serializer>(
    category: &AssetCategory,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(category.as_str())
}

fn render_json(rows: &[Row<'_>]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), rows).context("failed to render json output")?;
    println!();
    Ok(())
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
        })
    }
}
