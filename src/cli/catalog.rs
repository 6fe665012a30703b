use clap::{Parser, ValueEnum};
use gsa::{AssetCategory, domain::catalog::MACS};

use super::terminal::Colorize;

#[derive(Debug, Parser)]
pub struct Catalog {
    /// The table to show (default: all)
    #[arg(value_enum)]
    table: Option<Table>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Table {
    Macs,
    Vehicles,
    Equipment,
    Furniture,
}

impl Table {
    const ALL: [Self; 4] = [Self::Macs, Self::Vehicles, Self::Equipment, Self::Furniture];

    const fn title(self) -> &'static str {
        match self {
            Self::Macs => "Ministries, agencies and commissions",
            Self::Vehicles => "Vehicle classes",
            Self::Equipment => "Equipment classes",
            Self::Furniture => "Furniture classes",
        }
    }

    const fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Macs => MACS,
            Self::Vehicles => AssetCategory::Vehicle.classes(),
            Self::Equipment => AssetCategory::Equipment.classes(),
            Self::Furniture => AssetCategory::Furniture.classes(),
        }
    }
}

impl Catalog {
    pub fn run(self) {
        let tables = self.table.map_or(Table::ALL.to_vec(), |table| vec![table]);

        for (index, table) in tables.into_iter().enumerate() {
            if index > 0 {
                println!();
            }
            println!("{}", table.title().info());
            for (name, code) in table.entries() {
                println!("  {code:<4} {name}");
            }
        }
    }
}
