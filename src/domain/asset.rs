use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::catalog::AssetCategory;

/// A single asset as held in a registry collection.
///
/// Field names follow the web backend's JSON (`vehicleType`, `gsaCode`, ...).
/// Fields this crate does not interpret (make, model, serial number, ...) are
/// kept in [`extra`](Self::extra) and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// The record's identifier. Numeric identifiers are read as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Full name of the MAC that owns the asset.
    #[serde(default)]
    pub department: String,

    /// Free-form vehicle type ("car", "SUV", ...). Vehicles only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,

    /// Class name for equipment and furniture ("Computer", "Desk", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// The asset's GSA code. Legacy records may have none, or an empty one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsa_code: Option<String>,

    /// Codes the asset carried before being transferred, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_history: Vec<CodeHistoryEntry>,

    /// When the asset was registered through this tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,

    /// Any other fields present in the source record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssetRecord {
    /// Creates a record with only an identifier and owning department.
    #[must_use]
    pub fn new(id: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            department: department.into(),
            vehicle_type: None,
            class_name: None,
            gsa_code: None,
            code_history: Vec::new(),
            registered_at: None,
            extra: Map::new(),
        }
    }

    /// Sets the vehicle type.
    #[must_use]
    pub fn with_vehicle_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = Some(vehicle_type.into());
        self
    }

    /// Sets the equipment or furniture class name.
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Sets the GSA code.
    #[must_use]
    pub fn with_gsa_code(mut self, code: impl Into<String>) -> Self {
        self.gsa_code = Some(code.into());
        self
    }

    /// Returns the GSA code, treating an empty string as no code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.gsa_code.as_deref().filter(|code| !code.is_empty())
    }

    /// Returns the label used to pick the asset's class code: the vehicle
    /// type for vehicles, the class name otherwise.
    #[must_use]
    pub fn class_label(&self, category: AssetCategory) -> &str {
        let label = match category {
            AssetCategory::Vehicle => self.vehicle_type.as_deref(),
            AssetCategory::Equipment | AssetCategory::Furniture => self.class_name.as_deref(),
        };
        label.unwrap_or_default()
    }
}

/// A code an asset carried before a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeHistoryEntry {
    /// The retired code.
    pub code: String,
    /// The department that owned the asset under that code.
    pub department: String,
    /// When the code was retired.
    pub retired_at: DateTime<Utc>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
