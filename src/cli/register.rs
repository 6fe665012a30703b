use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gsa::{
    AssetCategory, Directory, ManualCount,
    domain::code::describe_code,
    storage::NewAsset,
};
use serde_json::{Map, Value};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
pub struct Register {
    /// Asset category (vehicle, equipment, furniture)
    category: AssetCategory,

    /// Full name of the owning ministry, agency or commission
    #[arg(long, short)]
    department: String,

    /// Vehicle type, or equipment/furniture class name
    #[arg(long, short)]
    class: String,

    /// Use this sequence count (1-999) instead of the next free one
    #[arg(long)]
    count: Option<ManualCount>,

    /// Further fields to store on the record, as key=value
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    attributes: Vec<(String, String)>,
}

impl Register {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root);

        let mut asset = NewAsset::new(self.department, self.class);
        asset.manual_count = self.count;
        asset.attributes = self
            .attributes
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<Map<_, _>>();

        let record = directory
            .register(self.category, asset)
            .with_context(|| format!("failed to register {}", self.category))?;

        let code = record.code().unwrap_or_default();
        println!("{} {code}", "✅".success());
        println!("   {}", describe_code(code).dim());
        println!("   id: {}", record.id);

        Ok(())
    }
}

fn parse_attribute(value: &str) -> Result<(String, String), String> {
    let (key, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, found '{value}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("attribute key must not be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}
