use std::path::PathBuf;

mod audit;
mod catalog;
mod list;
mod register;
mod terminal;
mod transfer;

use audit::Audit;
use catalog::Catalog;
use clap::ArgAction;
use gsa::{
    AssetCategory, Directory, GsaCode, ManualCount,
    domain::{
        catalog::mac_code_for,
        code::{describe_code, validate_code},
        generator::{code_exists, generate_asset_code, next_sequence_count},
    },
};
use list::List;
use register::Register;
use terminal::Colorize;
use tracing::instrument;
use transfer::Transfer;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the registry directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new registry directory
    Init(Init),

    /// Generate the next GSA code for an asset without registering it
    Generate(Generate),

    /// Split a GSA code into its parts
    Parse(Parse),

    /// Check that codes are well-formed
    ///
    /// Exits with code 2 if any code is malformed.
    Check(Check),

    /// Describe a GSA code in words
    Describe(Describe),

    /// Show the next sequence count for a ministry and class
    Next(Next),

    /// Check whether a code is already held by an asset
    Exists(Exists),

    /// Register a new asset and assign its code
    Register(Register),

    /// Move an asset to another ministry, issuing a new code
    Transfer(Transfer),

    /// List registered assets
    List(List),

    /// Scan the registry for coding problems
    Audit(Audit),

    /// Show the ministries and asset classes codes are built from
    Catalog(Catalog),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(root)?,
            Self::Generate(command) => command.run(root),
            Self::Parse(command) => command.run()?,
            Self::Check(command) => command.run(),
            Self::Describe(command) => command.run(),
            Self::Next(command) => command.run(root),
            Self::Exists(command) => command.run(root),
            Self::Register(command) => command.run(root)?,
            Self::Transfer(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Audit(command) => command.run(root)?,
            Self::Catalog(command) => command.run(),
        }
        Ok(())
    }
}

/// Warns the operator that a department has no MAC code.
fn warn_unknown_mac(mac: &str) {
    if mac_code_for(mac).is_empty() {
        eprintln!(
            "{}",
            format!("⚠️  MAC not recognised: '{mac}'. Run 'gsa catalog macs' for valid names.")
                .warning()
        );
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::init(root)?;

        println!(
            "Initialized asset registry in {}",
            directory.root().display()
        );
        println!("  Created: .gsa/config.toml");
        for category in AssetCategory::ALL {
            println!("  Collection: {}.json", category.collection());
        }
        println!();
        println!("Next steps:");
        println!("  gsa register vehicle --department \"Ministry of Health\" --class Sedan");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Generate {
    /// Full name of the owning ministry, agency or commission
    mac: String,

    /// Asset category (vehicle, equipment, furniture)
    category: AssetCategory,

    /// Vehicle type, or equipment/furniture class name
    class: String,

    /// Use this sequence count (1-999) instead of the next free one
    #[arg(long)]
    count: Option<ManualCount>,
}

impl Generate {
    #[instrument]
    fn run(self, root: PathBuf) {
        warn_unknown_mac(&self.mac);

        let directory = Directory::open(root);
        let code = generate_asset_code(
            &self.mac,
            self.category,
            &self.class,
            self.count,
            &directory.registry(),
        );
        println!("{code}");
    }
}

#[derive(Debug, clap::Parser)]
pub struct Parse {
    /// The code to decompose
    code: String,
}

impl Parse {
    #[instrument]
    fn run(self) -> anyhow::Result<()> {
        let Some(parsed) = GsaCode::parse(&self.code) else {
            anyhow::bail!("'{}' is not a GSA code", self.code);
        };

        println!("Prefix: {}", parsed.prefix());
        println!("MAC:    {}", parsed.mac_code());
        println!("Class:  {}", parsed.class_code());
        println!("Count:  {}", parsed.count());
        if !validate_code(&self.code) {
            println!("{}", "⚠️  Not a well-formed GSA code".warning());
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Check {
    /// The codes to check
    #[arg(required = true)]
    codes: Vec<String>,

    /// Only report malformed codes
    #[arg(long, short)]
    quiet: bool,
}

impl Check {
    #[instrument]
    fn run(self) {
        let mut invalid = 0;
        for code in &self.codes {
            if validate_code(code) {
                if !self.quiet {
                    println!("{} {code}", "✅".success());
                }
            } else {
                invalid += 1;
                println!("{} {code}", "❌".warning());
            }
        }

        if invalid > 0 {
            std::process::exit(2);
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Describe {
    /// The code to describe
    code: String,
}

impl Describe {
    #[instrument]
    fn run(self) {
        println!("{}", describe_code(&self.code));
    }
}

#[derive(Debug, clap::Parser)]
pub struct Next {
    /// Full name of the owning ministry, agency or commission
    mac: String,

    /// Asset category (vehicle, equipment, furniture)
    category: AssetCategory,

    /// Vehicle type, or equipment/furniture class name
    class: String,
}

impl Next {
    #[instrument]
    fn run(self, root: PathBuf) {
        warn_unknown_mac(&self.mac);

        let directory = Directory::open(root);
        let class_code = self.category.class_code_for(&self.class);
        let count =
            next_sequence_count(&self.mac, self.category, class_code, &directory.registry());
        println!("{count}");
    }
}

#[derive(Debug, clap::Parser)]
pub struct Exists {
    /// The code to look for
    code: String,

    /// Asset category (vehicle, equipment, furniture)
    category: AssetCategory,

    /// Ignore the asset with this id (the one being edited)
    #[arg(long)]
    exclude: Option<String>,
}

impl Exists {
    #[instrument]
    fn run(self, root: PathBuf) {
        let directory = Directory::open(root);
        if code_exists(
            &self.code,
            self.category,
            &directory.registry(),
            self.exclude.as_deref(),
        ) {
            println!("{} is in use", self.code);
        } else {
            println!("{} is free", self.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;
    use test_case::test_case;

    use super::*;

    const HEALTH: &str = "Ministry of Health";

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("gsa").chain(args.iter().copied()))
    }

    #[test_case("0"; "zero")]
    #[test_case("1000"; "above 999")]
    #[test_case("seven"; "not a number")]
    fn generate_rejects_invalid_manual_counts(count: &str) {
        let result = parse(&["generate", HEALTH, "vehicle", "Sedan", "--count", count]);
        assert!(result.is_err());
    }

    #[test_case("0"; "zero")]
    #[test_case("1000"; "above 999")]
    fn register_rejects_invalid_manual_counts(count: &str) {
        let result = parse(&[
            "register",
            "furniture",
            "--department",
            HEALTH,
            "--class",
            "Desk",
            "--count",
            count,
        ]);
        assert!(result.is_err());
    }

    #[test_case("vehicle")]
    #[test_case("Vehicles")]
    #[test_case("EQUIPMENT")]
    fn categories_parse_loosely(category: &str) {
        assert!(parse(&["next", HEALTH, category, "Sedan"]).is_ok());
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(parse(&["next", HEALTH, "boats", "Sedan"]).is_err());
    }

    #[test]
    fn init_run_creates_registry_once() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let cli = parse(&["init"]).unwrap();
        cli.command
            .run(root.clone())
            .expect("init command should succeed");
        assert!(root.join(".gsa/config.toml").exists());

        let cli = parse(&["init"]).unwrap();
        assert!(cli.command.run(root).is_err());
    }

    #[test]
    fn register_run_stores_manual_count_and_attributes() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        Directory::init(root.clone()).unwrap();

        let cli = parse(&[
            "register",
            "furniture",
            "--department",
            HEALTH,
            "--class",
            "Desk",
            "--count",
            "57",
            "--attr",
            "color=brown",
        ])
        .unwrap();
        cli.command
            .run(root.clone())
            .expect("register command should succeed");

        let records = Directory::open(root).load(AssetCategory::Furniture).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code(), Some("GSA-MOH-01-057"));
        assert_eq!(records[0].extra["color"], "brown");
    }

    #[test]
    fn register_run_fails_for_unknown_mac() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        Directory::init(root.clone()).unwrap();

        let cli = parse(&[
            "register",
            "vehicle",
            "--department",
            "Ministry of Magic",
            "--class",
            "car",
        ])
        .unwrap();

        assert!(cli.command.run(root.clone()).is_err());
        assert!(
            Directory::open(root)
                .load(AssetCategory::Vehicle)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn transfer_run_with_yes_skips_the_prompt() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let directory = Directory::init(root.clone()).unwrap();
        let record = directory
            .register(
                AssetCategory::Vehicle,
                gsa::storage::NewAsset::new(HEALTH, "SUV"),
            )
            .unwrap();

        let cli = parse(&[
            "transfer",
            "vehicle",
            record.id.as_str(),
            "Ministry of Finance",
            "--yes",
        ])
        .unwrap();
        cli.command
            .run(root)
            .expect("transfer command should succeed");

        let stored = directory.load(AssetCategory::Vehicle).unwrap();
        assert_eq!(stored[0].code(), Some("GSA-MOF-03-001"));
    }
}
