//! A filesystem backed asset registry
//!
//! A [`Directory`] holds one JSON file per asset category (`vehicles.json`,
//! `equipment.json`, `furniture.json`), each in the web backend's envelope
//! format, plus a `.gsa/config.toml`.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use chrono::Utc;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    domain::{
        AssetRecord, AssetRegistry, CodeHistoryEntry, Config, GsaCode, ManualCount,
        RegistryError,
        catalog::{AssetCategory, mac_code_for},
        code::{MAX_COUNT, PREFIX, build_code, validate_code},
        generator::{Retrying, generate_asset_code},
    },
    storage::envelope,
};

const CONFIG_DIR: &str = ".gsa";
const CONFIG_FILE: &str = "config.toml";

/// A filesystem backed registry of assets.
#[derive(Debug, Clone)]
pub struct Directory {
    /// The root of the directory the collections are stored in.
    root: PathBuf,
    config: Config,
}

impl Directory {
    /// Opens a registry directory.
    ///
    /// The configuration is read from `.gsa/config.toml`; defaults are used if
    /// it is missing or unreadable. Collections are read lazily.
    #[must_use]
    pub fn open(root: PathBuf) -> Self {
        let config = load_config(&root);
        Self { root, config }
    }

    /// Creates a new registry directory with a default configuration and
    /// empty collections.
    ///
    /// Existing collection files are left in place, so a directory of
    /// exported collections can be initialised.
    ///
    /// # Errors
    ///
    /// Fails if the directory is already initialised or cannot be written.
    pub fn init(root: PathBuf) -> Result<Self, InitError> {
        let config_dir = root.join(CONFIG_DIR);
        if config_dir.exists() {
            return Err(InitError::AlreadyInitialised(config_dir));
        }
        fs::create_dir_all(&config_dir)?;

        let config = Config::default();
        config
            .save(&config_dir.join(CONFIG_FILE))
            .map_err(InitError::Config)?;

        let directory = Self { root, config };
        for category in AssetCategory::ALL {
            if !directory.collection_path(category).exists() {
                directory.save(category, &[])?;
            }
        }

        tracing::info!("Initialised registry in {}", directory.root.display());
        Ok(directory)
    }

    /// Returns the root of the registry.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the path of a category's collection file.
    #[must_use]
    pub fn collection_path(&self, category: AssetCategory) -> PathBuf {
        self.root.join(format!("{}.json", category.collection()))
    }

    /// Returns this registry wrapped with the configured number of query
    /// retries.
    #[must_use]
    pub const fn registry(&self) -> Retrying<&Self> {
        Retrying::new(self, self.config.query_retries())
    }

    /// Reads every record of a category.
    ///
    /// A missing collection file reads as an empty collection.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or decoded.
    pub fn load(&self, category: AssetCategory) -> Result<Vec<AssetRecord>, RegistryError> {
        let path = self.collection_path(category);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No collection at {}, treating as empty", path.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(RegistryError::Io { path, source }),
        };

        envelope::decode(category, &json).map_err(|source| RegistryError::Envelope {
            collection: category.collection(),
            source,
        })
    }

    fn save(&self, category: AssetCategory, records: &[AssetRecord]) -> Result<(), RegistryError> {
        let json = envelope::encode(category, records).map_err(|source| {
            RegistryError::Envelope {
                collection: category.collection(),
                source,
            }
        })?;
        let path = self.collection_path(category);
        fs::write(&path, json).map_err(|source| RegistryError::Io { path, source })
    }

    fn check_mac(&self, department: &str) -> Result<(), UnknownMacError> {
        if mac_code_for(department).is_empty() && !self.config.allow_unknown_mac {
            return Err(UnknownMacError(department.to_string()));
        }
        Ok(())
    }

    /// Picks the code for an asset joining `department`.
    ///
    /// Automatic counts skip forward past codes already held or retired in
    /// the collection, starting again from `1` when the department's count
    /// has run past [`MAX_COUNT`]. If every count up to [`MAX_COUNT`] is
    /// taken the group is exhausted. A manual count is used as given, and
    /// refused if the code is taken while `check_collisions` is on.
    fn assign_code<E>(
        &self,
        category: AssetCategory,
        department: &str,
        class_label: &str,
        manual_count: Option<ManualCount>,
        records: &[AssetRecord],
    ) -> Result<String, E>
    where
        E: From<CollisionError> + From<ExhaustedError>,
    {
        let code = generate_asset_code(
            department,
            category,
            class_label,
            manual_count,
            &self.registry(),
        );

        if manual_count.is_some() {
            if self.config.check_collisions && is_taken(records, &code) {
                return Err(CollisionError(code).into());
            }
            return Ok(code);
        }

        let Some(parsed) = GsaCode::parse(&code) else {
            return Ok(code);
        };
        let start = if parsed.count() > MAX_COUNT {
            1
        } else {
            parsed.count()
        };
        (start..=MAX_COUNT)
            .map(|count| build_code(PREFIX, parsed.mac_code(), parsed.class_code(), count))
            .find(|candidate| !is_taken(records, candidate))
            .ok_or_else(|| {
                ExhaustedError {
                    category,
                    mac_code: parsed.mac_code().to_string(),
                    class_code: parsed.class_code().to_string(),
                }
                .into()
            })
    }

    /// Registers a new asset, assigning it a GSA code.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the department is not a known MAC and `allow_unknown_mac` is off
    /// - a manual count gives a code that is already taken and
    ///   `check_collisions` is on
    /// - every count up to 999 for the MAC and class is taken
    /// - the collection cannot be read or written
    pub fn register(
        &self,
        category: AssetCategory,
        asset: NewAsset,
    ) -> Result<AssetRecord, RegisterError> {
        self.check_mac(&asset.department)?;

        let mut records = self.load(category)?;
        let code = self.assign_code::<RegisterError>(
            category,
            &asset.department,
            &asset.class_label,
            asset.manual_count,
            &records,
        )?;

        let mut record = AssetRecord::new(Uuid::new_v4().to_string(), asset.department)
            .with_gsa_code(code);
        record.registered_at = Some(Utc::now());
        record.extra = asset.attributes;
        record = match category {
            AssetCategory::Vehicle => record.with_vehicle_type(asset.class_label),
            AssetCategory::Equipment | AssetCategory::Furniture => {
                record.with_class_name(asset.class_label)
            }
        };

        records.push(record.clone());
        self.save(category, &records)?;

        tracing::info!(
            "Registered {category} {} as {}",
            record.id,
            record.code().unwrap_or_default()
        );
        Ok(record)
    }

    /// Transfers an asset to another MAC.
    ///
    /// The asset receives a new code for the new MAC, keeping its class. Its
    /// previous code is retired into the record's code history and is never
    /// reissued.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the new department is not a known MAC and `allow_unknown_mac` is off
    /// - no asset with the id exists, or it already belongs to the department
    /// - every count up to 999 for the new MAC and class is taken
    /// - the collection cannot be read or written
    pub fn transfer(
        &self,
        category: AssetCategory,
        id: &str,
        new_department: &str,
    ) -> Result<Transfer, TransferError> {
        self.check_mac(new_department)?;

        let mut records = self.load(category)?;
        let record = records
            .iter()
            .find(|record| record.id == id)
            .ok_or_else(|| TransferError::NotFound(id.to_string()))?;
        if record.department == new_department {
            return Err(TransferError::SameDepartment(new_department.to_string()));
        }

        let code = self.assign_code::<TransferError>(
            category,
            new_department,
            record.class_label(category),
            None,
            &records,
        )?;

        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| TransferError::NotFound(id.to_string()))?;
        let previous_department = std::mem::replace(&mut record.department, new_department.into());
        let previous_code = record.gsa_code.replace(code.clone()).filter(|c| !c.is_empty());
        if let Some(retired) = &previous_code {
            record.code_history.push(CodeHistoryEntry {
                code: retired.clone(),
                department: previous_department.clone(),
                retired_at: Utc::now(),
            });
        }

        self.save(category, &records)?;

        tracing::info!("Transferred {category} {id} from '{previous_department}' to '{new_department}' as {code}");
        Ok(Transfer {
            id: id.to_string(),
            previous_department,
            previous_code,
            code,
        })
    }

    /// Scans every collection for coding problems.
    ///
    /// Collections are scanned in parallel. An unreadable collection is
    /// reported as an issue rather than aborting the audit.
    #[must_use]
    pub fn audit(&self) -> AuditReport {
        let reports: Vec<_> = AssetCategory::ALL
            .par_iter()
            .map(|&category| match self.load(category) {
                Ok(records) => (records.len(), audit_collection(category, &records)),
                Err(e) => (
                    0,
                    vec![AuditIssue::Unreadable {
                        category,
                        error: e.to_string(),
                    }],
                ),
            })
            .collect();

        let scanned = reports.iter().map(|(scanned, _)| scanned).sum();
        let issues = reports.into_iter().flat_map(|(_, issues)| issues).collect();
        AuditReport { scanned, issues }
    }
}

impl AssetRegistry for Directory {
    fn query(&self, category: AssetCategory) -> Result<Vec<AssetRecord>, RegistryError> {
        self.load(category)
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Whether any record holds `code`, now or in its history.
fn is_taken(records: &[AssetRecord], code: &str) -> bool {
    records.iter().any(|record| {
        record.code() == Some(code) || record.code_history.iter().any(|entry| entry.code == code)
    })
}

fn audit_collection(category: AssetCategory, records: &[AssetRecord]) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let mut holders: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for record in records {
        let Some(code) = record.code() else {
            issues.push(AuditIssue::MissingCode {
                category,
                id: record.id.clone(),
            });
            continue;
        };
        holders.entry(code).or_default().push(&record.id);

        if !validate_code(code) {
            issues.push(AuditIssue::InvalidCode {
                category,
                id: record.id.clone(),
                code: code.to_string(),
            });
            continue;
        }

        let expected = mac_code_for(&record.department);
        let matches_department = GsaCode::parse(code).is_some_and(|c| c.mac_code() == expected);
        if !expected.is_empty() && !matches_department {
            issues.push(AuditIssue::DepartmentMismatch {
                category,
                id: record.id.clone(),
                code: code.to_string(),
                department: record.department.clone(),
            });
        }
    }

    issues.extend(
        holders
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(code, ids)| AuditIssue::DuplicateCode {
                category,
                code: code.to_string(),
                ids: ids.into_iter().map(str::to_string).collect(),
            }),
    );

    issues
}

/// The details of an asset to register.
#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    /// Full name of the owning MAC.
    pub department: String,
    /// Vehicle type, or equipment/furniture class name.
    pub class_label: String,
    /// Sequence count to use instead of the next free one.
    pub manual_count: Option<ManualCount>,
    /// Further fields to store on the record.
    pub attributes: Map<String, Value>,
}

impl NewAsset {
    /// Creates the details of an asset owned by `department` with class
    /// `class_label`.
    #[must_use]
    pub fn new(department: impl Into<String>, class_label: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            class_label: class_label.into(),
            ..Self::default()
        }
    }
}

/// The outcome of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// The transferred asset.
    pub id: String,
    /// The department the asset was transferred from.
    pub previous_department: String,
    /// The code the asset carried before, if any.
    pub previous_code: Option<String>,
    /// The asset's new code.
    pub code: String,
}

/// The findings of [`Directory::audit`].
#[derive(Debug, Default)]
pub struct AuditReport {
    /// Number of records examined.
    pub scanned: usize,
    /// Everything found, grouped by category.
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    /// Returns the issues that need fixing, skipping records that simply
    /// predate coding.
    pub fn problems(&self) -> impl Iterator<Item = &AuditIssue> {
        self.issues.iter().filter(|issue| issue.is_problem())
    }
}

/// A single audit finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditIssue {
    /// The collection could not be read.
    Unreadable {
        /// The affected category.
        category: AssetCategory,
        /// Why it could not be read.
        error: String,
    },
    /// A legacy record without a code.
    MissingCode {
        /// The affected category.
        category: AssetCategory,
        /// The record.
        id: String,
    },
    /// A code that does not have the GSA shape.
    InvalidCode {
        /// The affected category.
        category: AssetCategory,
        /// The record.
        id: String,
        /// The offending code.
        code: String,
    },
    /// A code held by more than one record.
    DuplicateCode {
        /// The affected category.
        category: AssetCategory,
        /// The shared code.
        code: String,
        /// Every record holding it.
        ids: Vec<String>,
    },
    /// A code whose MAC segment differs from the record's department.
    DepartmentMismatch {
        /// The affected category.
        category: AssetCategory,
        /// The record.
        id: String,
        /// The record's code.
        code: String,
        /// The record's department.
        department: String,
    },
}

impl AuditIssue {
    /// A short machine-readable name for the kind of issue.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unreadable { .. } => "unreadable",
            Self::MissingCode { .. } => "missing_code",
            Self::InvalidCode { .. } => "invalid_code",
            Self::DuplicateCode { .. } => "duplicate_code",
            Self::DepartmentMismatch { .. } => "department_mismatch",
        }
    }

    /// The category the issue was found in.
    #[must_use]
    pub const fn category(&self) -> AssetCategory {
        match self {
            Self::Unreadable { category, .. }
            | Self::MissingCode { category, .. }
            | Self::InvalidCode { category, .. }
            | Self::DuplicateCode { category, .. }
            | Self::DepartmentMismatch { category, .. } => *category,
        }
    }

    /// Whether the issue needs fixing. Uncoded legacy records do not.
    #[must_use]
    pub const fn is_problem(&self) -> bool {
        !matches!(self, Self::MissingCode { .. })
    }
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { category, error } => {
                write!(f, "{category} collection unreadable: {error}")
            }
            Self::MissingCode { category, id } => write!(f, "{category} {id} has no GSA code"),
            Self::InvalidCode { category, id, code } => {
                write!(f, "{category} {id} has malformed code '{code}'")
            }
            Self::DuplicateCode { category, code, ids } => {
                write!(f, "{category} code {code} is shared by {}", ids.join(", "))
            }
            Self::DepartmentMismatch {
                category,
                id,
                code,
                department,
            } => write!(
                f,
                "{category} {id} has code {code} but belongs to '{department}'"
            ),
        }
    }
}

/// Error returned when a department is not in the MAC catalogue.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("MAC not recognised: '{0}'")]
pub struct UnknownMacError(String);

/// Error returned when a generated code is already held by another asset.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("code {0} is already in use")]
pub struct CollisionError(String);

/// Error returned when every count for a MAC and class is already taken.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("no free {category} code left under GSA-{mac_code}-{class_code}")]
pub struct ExhaustedError {
    category: AssetCategory,
    mac_code: String,
    class_code: String,
}

/// Errors that can occur while initialising a registry directory.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The directory already has a `.gsa` folder.
    #[error("registry already initialised (found {})", .0.display())]
    AlreadyInitialised(PathBuf),
    /// The configuration could not be written.
    #[error("{0}")]
    Config(String),
    /// The configuration folder could not be created.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An empty collection could not be written.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors that can occur while registering an asset.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// The department is not a known MAC.
    #[error(transparent)]
    UnknownMac(#[from] UnknownMacError),
    /// The generated code is already in use.
    #[error(transparent)]
    Collision(#[from] CollisionError),
    /// Every count for the MAC and class is taken.
    #[error(transparent)]
    Exhausted(#[from] ExhaustedError),
    /// The collection could not be read or written.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors that can occur while transferring an asset.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The new department is not a known MAC.
    #[error(transparent)]
    UnknownMac(#[from] UnknownMacError),
    /// No asset with the given id exists.
    #[error("asset {0} not found")]
    NotFound(String),
    /// The asset already belongs to the department.
    #[error("asset already belongs to '{0}'")]
    SameDepartment(String),
    /// The generated code is already in use.
    #[error(transparent)]
    Collision(#[from] CollisionError),
    /// Every count for the MAC and class is taken.
    #[error(transparent)]
    Exhausted(#[from] ExhaustedError),
    /// The collection could not be read or written.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const HEALTH: &str = "Ministry of Health";
    const FINANCE: &str = "Ministry of Finance";

    fn setup_temp_directory() -> (TempDir, Directory) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let directory = Directory::init(tmp.path().to_path_buf()).unwrap();
        (tmp, directory)
    }

    fn write_collection(root: &Path, file: &str, json: &str) {
        fs::write(root.join(file), json).unwrap();
    }

    #[test]
    fn init_creates_config_and_empty_collections() {
        let (tmp, directory) = setup_temp_directory();

        assert!(tmp.path().join(".gsa/config.toml").exists());
        for category in AssetCategory::ALL {
            assert!(directory.collection_path(category).exists());
            assert!(directory.load(category).unwrap().is_empty());
        }
    }

    #[test]
    fn init_twice_fails() {
        let (tmp, _directory) = setup_temp_directory();
        let result = Directory::init(tmp.path().to_path_buf());
        assert!(matches!(result, Err(InitError::AlreadyInitialised(_))));
    }

    #[test]
    fn init_keeps_existing_collections() {
        let tmp = TempDir::new().unwrap();
        write_collection(
            tmp.path(),
            "vehicles.json",
            r#"{ "success": true, "vehicles": [ { "id": 1, "department": "Ministry of Health" } ] }"#,
        );

        let directory = Directory::init(tmp.path().to_path_buf()).unwrap();

        assert_eq!(directory.load(AssetCategory::Vehicle).unwrap().len(), 1);
    }

    #[test]
    fn open_without_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::open(tmp.path().to_path_buf());
        assert_eq!(directory.config(), &Config::default());
        assert!(directory.load(AssetCategory::Furniture).unwrap().is_empty());
    }

    #[test]
    fn open_reads_config() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".gsa")).unwrap();
        fs::write(
            tmp.path().join(".gsa/config.toml"),
            "_version = \"1\"\nallow_unknown_mac = true\n",
        )
        .unwrap();

        let directory = Directory::open(tmp.path().to_path_buf());

        assert!(directory.config().allow_unknown_mac);
    }

    #[test]
    fn malformed_collection_is_an_error_on_load() {
        let (tmp, directory) = setup_temp_directory();
        write_collection(tmp.path(), "vehicles.json", "{ not json");

        let result = directory.load(AssetCategory::Vehicle);
        assert!(matches!(result, Err(RegistryError::Envelope { .. })));
    }

    #[test]
    fn registering_assigns_sequential_codes() {
        let (_tmp, directory) = setup_temp_directory();

        let first = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "Sedan"))
            .unwrap();
        let second = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "car"))
            .unwrap();
        let suv = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "SUV"))
            .unwrap();

        assert_eq!(first.code(), Some("GSA-MOH-02-001"));
        assert_eq!(second.code(), Some("GSA-MOH-02-002"));
        assert_eq!(suv.code(), Some("GSA-MOH-03-001"));
        assert_eq!(second.vehicle_type.as_deref(), Some("car"));
        assert!(first.registered_at.is_some());
        assert_ne!(first.id, second.id);

        let stored = directory.load(AssetCategory::Vehicle).unwrap();
        assert_eq!(stored, vec![first, second, suv]);
    }

    #[test]
    fn registering_continues_after_imported_records() {
        let (tmp, directory) = setup_temp_directory();
        write_collection(
            tmp.path(),
            "vehicles.json",
            r#"{ "success": true, "vehicles": [
                { "id": 1, "department": "Ministry of Health", "vehicleType": "sedan" },
                { "id": 2, "department": "Ministry of Health", "vehicleType": "sedan" }
            ] }"#,
        );

        let record = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "Sedan"))
            .unwrap();

        assert_eq!(record.code(), Some("GSA-MOH-02-003"));
        assert_eq!(directory.load(AssetCategory::Vehicle).unwrap().len(), 3);
    }

    #[test]
    fn registering_keeps_attributes() {
        let (_tmp, directory) = setup_temp_directory();
        let mut asset = NewAsset::new(FINANCE, "Laptop");
        asset
            .attributes
            .insert("name".to_string(), Value::from("Finance laptop"));

        let record = directory.register(AssetCategory::Equipment, asset).unwrap();

        assert_eq!(record.code(), Some("GSA-MOF-02-001"));
        assert_eq!(record.class_name.as_deref(), Some("Laptop"));
        let stored = directory.load(AssetCategory::Equipment).unwrap();
        assert_eq!(stored[0].extra["name"], "Finance laptop");
    }

    #[test]
    fn registering_with_manual_count() {
        let (_tmp, directory) = setup_temp_directory();
        let mut asset = NewAsset::new(HEALTH, "Desk");
        asset.manual_count = Some(ManualCount::new(57).unwrap());

        let record = directory.register(AssetCategory::Furniture, asset).unwrap();

        assert_eq!(record.code(), Some("GSA-MOH-01-057"));
    }

    #[test]
    fn registering_a_colliding_manual_count_is_refused() {
        let (_tmp, directory) = setup_temp_directory();
        directory
            .register(AssetCategory::Furniture, NewAsset::new(HEALTH, "Desk"))
            .unwrap();

        let mut asset = NewAsset::new(HEALTH, "Desk");
        asset.manual_count = Some(ManualCount::new(1).unwrap());
        let result = directory.register(AssetCategory::Furniture, asset);

        assert!(matches!(result, Err(RegisterError::Collision(_))));
        assert_eq!(directory.load(AssetCategory::Furniture).unwrap().len(), 1);
    }

    #[test]
    fn registering_a_collision_is_allowed_when_checks_are_off() {
        let (tmp, _directory) = setup_temp_directory();
        fs::write(
            tmp.path().join(".gsa/config.toml"),
            "_version = \"1\"\ncheck_collisions = false\n",
        )
        .unwrap();
        let directory = Directory::open(tmp.path().to_path_buf());

        for _ in 0..2 {
            let mut asset = NewAsset::new(HEALTH, "Desk");
            asset.manual_count = Some(ManualCount::new(1).unwrap());
            directory.register(AssetCategory::Furniture, asset).unwrap();
        }

        assert_eq!(directory.load(AssetCategory::Furniture).unwrap().len(), 2);
    }

    #[test]
    fn registering_under_unknown_mac_is_refused() {
        let (_tmp, directory) = setup_temp_directory();

        let error = directory
            .register(AssetCategory::Vehicle, NewAsset::new("Ministry of Magic", "car"))
            .unwrap_err();

        assert_eq!(error.to_string(), "MAC not recognised: 'Ministry of Magic'");
    }

    #[test]
    fn registering_into_a_corrupt_collection_fails() {
        let (tmp, directory) = setup_temp_directory();
        write_collection(tmp.path(), "vehicles.json", r#"{ "success": false }"#);

        let result = directory.register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "car"));

        assert!(matches!(result, Err(RegisterError::Registry(_))));
    }

    #[test]
    fn transfer_issues_new_code_and_keeps_history() {
        let (_tmp, directory) = setup_temp_directory();
        let record = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "SUV"))
            .unwrap();

        let transfer = directory
            .transfer(AssetCategory::Vehicle, &record.id, FINANCE)
            .unwrap();

        assert_eq!(transfer.previous_code.as_deref(), Some("GSA-MOH-03-001"));
        assert_eq!(transfer.previous_department, HEALTH);
        assert_eq!(transfer.code, "GSA-MOF-03-001");

        let stored = directory.load(AssetCategory::Vehicle).unwrap();
        assert_eq!(stored[0].department, FINANCE);
        assert_eq!(stored[0].code(), Some("GSA-MOF-03-001"));
        assert_eq!(stored[0].code_history.len(), 1);
        assert_eq!(stored[0].code_history[0].code, "GSA-MOH-03-001");
        assert_eq!(stored[0].code_history[0].department, HEALTH);
    }

    #[test]
    fn transfer_does_not_reuse_the_old_code() {
        let (_tmp, directory) = setup_temp_directory();
        let first = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "car"))
            .unwrap();
        directory
            .transfer(AssetCategory::Vehicle, &first.id, FINANCE)
            .unwrap();
        directory
            .transfer(AssetCategory::Vehicle, &first.id, HEALTH)
            .unwrap();

        let stored = directory.load(AssetCategory::Vehicle).unwrap();
        let history: Vec<_> = stored[0].code_history.iter().map(|h| h.code.as_str()).collect();
        assert_eq!(history, ["GSA-MOH-02-001", "GSA-MOF-02-001"]);
        assert_eq!(stored[0].code(), Some("GSA-MOH-02-002"));
    }

    /// Every code from 001 to 999 for a MAC and class, already issued.
    fn full_group(
        category: AssetCategory,
        department: &str,
        mac_code: &str,
        class_label: &str,
        class_code: &str,
    ) -> Vec<AssetRecord> {
        (1..=MAX_COUNT)
            .map(|count| {
                let record = AssetRecord::new(format!("{mac_code}-{count}"), department)
                    .with_gsa_code(build_code(PREFIX, mac_code, class_code, count));
                match category {
                    AssetCategory::Vehicle => record.with_vehicle_type(class_label),
                    AssetCategory::Equipment | AssetCategory::Furniture => {
                        record.with_class_name(class_label)
                    }
                }
            })
            .collect()
    }

    fn write_records(root: &Path, category: AssetCategory, records: &[AssetRecord]) {
        let json = envelope::encode(category, records).unwrap();
        write_collection(root, &format!("{}.json", category.collection()), &json);
    }

    #[test]
    fn registering_into_a_full_group_is_refused() {
        let (tmp, directory) = setup_temp_directory();
        let records = full_group(AssetCategory::Vehicle, HEALTH, "MOH", "Sedan", "02");
        write_records(tmp.path(), AssetCategory::Vehicle, &records);

        let error = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "Sedan"))
            .unwrap_err();

        assert!(matches!(error, RegisterError::Exhausted(_)));
        assert_eq!(
            error.to_string(),
            "no free vehicle code left under GSA-MOH-02"
        );
        assert_eq!(directory.load(AssetCategory::Vehicle).unwrap(), records);
    }

    #[test]
    fn registering_into_a_full_group_is_refused_without_collision_checks() {
        let (tmp, _directory) = setup_temp_directory();
        fs::write(
            tmp.path().join(".gsa/config.toml"),
            "_version = \"1\"\ncheck_collisions = false\n",
        )
        .unwrap();
        let records = full_group(AssetCategory::Furniture, HEALTH, "MOH", "Desk", "01");
        write_records(tmp.path(), AssetCategory::Furniture, &records);
        let directory = Directory::open(tmp.path().to_path_buf());

        let result = directory.register(AssetCategory::Furniture, NewAsset::new(HEALTH, "Desk"));

        assert!(matches!(result, Err(RegisterError::Exhausted(_))));
        assert_eq!(directory.load(AssetCategory::Furniture).unwrap().len(), 999);
    }

    #[test]
    fn registering_after_department_count_passes_999_starts_from_one() {
        let (tmp, directory) = setup_temp_directory();
        let records = full_group(AssetCategory::Equipment, HEALTH, "MOH", "Computer", "01");
        write_records(tmp.path(), AssetCategory::Equipment, &records);

        let first = directory
            .register(AssetCategory::Equipment, NewAsset::new(HEALTH, "Printer"))
            .unwrap();
        let second = directory
            .register(AssetCategory::Equipment, NewAsset::new(HEALTH, "Printer"))
            .unwrap();

        assert_eq!(first.code(), Some("GSA-MOH-03-001"));
        assert_eq!(second.code(), Some("GSA-MOH-03-002"));
        assert!(validate_code(second.code().unwrap()));
    }

    #[test]
    fn transferring_into_a_full_group_is_refused() {
        let (tmp, directory) = setup_temp_directory();
        let mut records = full_group(AssetCategory::Vehicle, FINANCE, "MOF", "Sedan", "02");
        records.push(
            AssetRecord::new("moving", HEALTH)
                .with_vehicle_type("Sedan")
                .with_gsa_code("GSA-MOH-02-001"),
        );
        write_records(tmp.path(), AssetCategory::Vehicle, &records);

        let result = directory.transfer(AssetCategory::Vehicle, "moving", FINANCE);

        assert!(matches!(result, Err(TransferError::Exhausted(_))));
        assert_eq!(directory.load(AssetCategory::Vehicle).unwrap(), records);
    }

    #[test]
    fn registering_skips_retired_codes() {
        let (_tmp, directory) = setup_temp_directory();
        let first = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "car"))
            .unwrap();
        directory
            .transfer(AssetCategory::Vehicle, &first.id, FINANCE)
            .unwrap();

        let next = directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "car"))
            .unwrap();

        assert_eq!(next.code(), Some("GSA-MOH-02-002"));
    }

    #[test]
    fn registering_skips_codes_still_held_after_deletions() {
        let (tmp, directory) = setup_temp_directory();
        write_collection(
            tmp.path(),
            "furniture.json",
            r#"{ "success": true, "furniture": [
                { "id": 2, "department": "Ministry of Health", "className": "Desk", "gsaCode": "GSA-MOH-01-002" }
            ] }"#,
        );

        let record = directory
            .register(AssetCategory::Furniture, NewAsset::new(HEALTH, "Desk"))
            .unwrap();

        assert_eq!(record.code(), Some("GSA-MOH-01-003"));
    }

    #[test]
    fn transfer_of_uncoded_asset_has_no_history() {
        let (tmp, directory) = setup_temp_directory();
        write_collection(
            tmp.path(),
            "equipment.json",
            r#"{ "success": true, "equipment": [
                { "id": 9, "department": "Ministry of Health", "className": "Printer", "gsaCode": "" }
            ] }"#,
        );

        let transfer = directory
            .transfer(AssetCategory::Equipment, "9", FINANCE)
            .unwrap();

        assert_eq!(transfer.previous_code, None);
        assert_eq!(transfer.code, "GSA-MOF-03-001");
        let stored = directory.load(AssetCategory::Equipment).unwrap();
        assert!(stored[0].code_history.is_empty());
    }

    #[test]
    fn transfer_errors() {
        let (_tmp, directory) = setup_temp_directory();
        let record = directory
            .register(AssetCategory::Furniture, NewAsset::new(HEALTH, "Sofa"))
            .unwrap();

        assert!(matches!(
            directory.transfer(AssetCategory::Furniture, "missing", FINANCE),
            Err(TransferError::NotFound(_))
        ));
        assert!(matches!(
            directory.transfer(AssetCategory::Furniture, &record.id, HEALTH),
            Err(TransferError::SameDepartment(_))
        ));
        assert!(matches!(
            directory.transfer(AssetCategory::Furniture, &record.id, "Nowhere"),
            Err(TransferError::UnknownMac(_))
        ));
    }

    #[test]
    fn audit_of_clean_registry_finds_nothing() {
        let (_tmp, directory) = setup_temp_directory();
        directory
            .register(AssetCategory::Vehicle, NewAsset::new(HEALTH, "car"))
            .unwrap();
        directory
            .register(AssetCategory::Equipment, NewAsset::new(HEALTH, "Computer"))
            .unwrap();

        let report = directory.audit();

        assert_eq!(report.scanned, 2);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn audit_reports_each_kind_of_issue() {
        let (tmp, directory) = setup_temp_directory();
        write_collection(
            tmp.path(),
            "vehicles.json",
            r#"{ "success": true, "vehicles": [
                { "id": 1, "department": "Ministry of Health", "gsaCode": "GSA-MOH-02-001" },
                { "id": 2, "department": "Ministry of Health", "gsaCode": "GSA-MOH-02-001" },
                { "id": 3, "department": "Ministry of Health", "gsaCode": "GSA-MOH-02-1" },
                { "id": 4, "department": "Ministry of Finance", "gsaCode": "GSA-MOH-02-004" },
                { "id": 5, "department": "Ministry of Health" }
            ] }"#,
        );
        write_collection(tmp.path(), "furniture.json", "garbage");

        let report = directory.audit();
        let kinds: Vec<_> = report.issues.iter().map(AuditIssue::kind).collect();

        assert_eq!(report.scanned, 5);
        assert_eq!(
            kinds,
            [
                "invalid_code",
                "department_mismatch",
                "missing_code",
                "duplicate_code",
                "unreadable"
            ]
        );
        assert_eq!(report.problems().count(), 4);
        assert_eq!(
            report.issues[3].to_string(),
            "vehicle code GSA-MOH-02-001 is shared by 1, 2"
        );
        assert_eq!(report.issues[4].category(), AssetCategory::Furniture);
    }
}
