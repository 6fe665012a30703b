//! Domain models for asset coding.
//!
//! This module contains the compiled-in catalogue of ministries and asset
//! classes, the GSA code type itself, and the generator that assigns codes
//! against a registry of existing assets.

/// Asset records as stored in a registry.
pub mod asset;
pub use asset::{AssetRecord, CodeHistoryEntry};

/// Ministries, asset classes and their short codes.
pub mod catalog;
pub use catalog::AssetCategory;

/// The GSA code type, its formatting and parsing.
pub mod code;
pub use code::{GsaCode, ManualCount};

mod config;
pub use config::Config;

/// Sequence counting and collision checks against a registry.
pub mod generator;
pub use generator::{AssetRegistry, RegistryError};
