//! GSA Asset Codes
//!
//! Government assets (vehicles, equipment and furniture) are labelled with a
//! structured identifier of the form `GSA-<MAC>-<CLASS>-<COUNT>`. This crate
//! builds, parses, validates and describes those identifiers, and keeps a
//! plain-JSON registry of the assets they label.

pub mod domain;
pub use domain::{
    AssetCategory, AssetRecord, AssetRegistry, Config, GsaCode, ManualCount, RegistryError,
};

/// Registry backends: in-memory and filesystem.
pub mod storage;
pub use storage::{Directory, MemoryRegistry};
