//! Assigning GSA codes against a registry of existing assets.
//!
//! Registry reads can fail. None of the functions here pass such a failure
//! on: sequence counting falls back to `1` and collision checks to `false`,
//! with a warning logged. Registering an asset must never be blocked by a
//! failure to compute its sequence number; an operator can correct a
//! colliding code by hand.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use tracing::instrument;

use crate::domain::{
    AssetRecord,
    catalog::{AssetCategory, mac_code_for, vehicle_class_code_for},
    code::{ManualCount, PREFIX, build_code},
};

/// A read-only source of asset records.
pub trait AssetRegistry {
    /// Returns every asset of the given category.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn query(&self, category: AssetCategory) -> Result<Vec<AssetRecord>, RegistryError>;
}

impl<R: AssetRegistry + ?Sized> AssetRegistry for &R {
    fn query(&self, category: AssetCategory) -> Result<Vec<AssetRecord>, RegistryError> {
        (**self).query(category)
    }
}

/// Errors raised by registry backends.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A collection file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The collection file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A collection could not be decoded or encoded.
    #[error("invalid {collection} collection: {source}")]
    Envelope {
        /// The collection name.
        collection: &'static str,
        /// The underlying error.
        source: crate::storage::envelope::EnvelopeError,
    },

    /// The backend is unavailable for some other reason.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Counts the assets already coded for a MAC and returns the next sequence
/// number.
///
/// Assets are matched on `department == mac_name`. Vehicles are further
/// restricted to those whose normalised vehicle type has class `class_code`.
///
/// If the registry cannot be queried this returns `1`.
#[instrument(level = "debug", skip(registry))]
pub fn next_sequence_count<R: AssetRegistry + ?Sized>(
    mac_name: &str,
    category: AssetCategory,
    class_code: &str,
    registry: &R,
) -> u32 {
    let records = match registry.query(category) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                "Could not count existing {category} assets for '{mac_name}', assuming first: {e}"
            );
            return 1;
        }
    };

    let existing = records
        .iter()
        .filter(|record| record.department == mac_name)
        .filter(|record| {
            category != AssetCategory::Vehicle
                || vehicle_class_code_for(record.class_label(category)) == class_code
        })
        .count();

    u32::try_from(existing)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

/// Generates a GSA code for a new asset.
///
/// The MAC code comes from the catalogue (empty if `mac_name` is unknown),
/// the class code from `class_label` under the category's rules, and the
/// count from `manual_count` when given, otherwise from
/// [`next_sequence_count`].
#[instrument(level = "debug", skip(registry))]
pub fn generate_asset_code<R: AssetRegistry + ?Sized>(
    mac_name: &str,
    category: AssetCategory,
    class_label: &str,
    manual_count: Option<ManualCount>,
    registry: &R,
) -> String {
    let mac_code = mac_code_for(mac_name);
    let class_code = category.class_code_for(class_label);
    let count = manual_count.map_or_else(
        || next_sequence_count(mac_name, category, class_code, registry),
        ManualCount::get,
    );

    build_code(PREFIX, mac_code, class_code, count)
}

/// Returns `true` if an asset of the category already carries `code`.
///
/// The asset with id `exclude_id` is ignored, so an asset being edited does
/// not collide with itself.
///
/// If the registry cannot be queried this returns `false`. A collision can
/// therefore go unnoticed while the registry is unreachable.
#[instrument(level = "debug", skip(registry))]
pub fn code_exists<R: AssetRegistry + ?Sized>(
    code: &str,
    category: AssetCategory,
    registry: &R,
    exclude_id: Option<&str>,
) -> bool {
    match registry.query(category) {
        Ok(records) => records
            .iter()
            .filter(|record| Some(record.id.as_str()) != exclude_id)
            .any(|record| record.code() == Some(code)),
        Err(e) => {
            tracing::warn!("Could not check {category} assets for code {code}: {e}");
            false
        }
    }
}

/// A registry wrapper that re-issues failed queries.
#[derive(Debug, Clone)]
pub struct Retrying<R> {
    inner: R,
    retries: u32,
}

impl<R> Retrying<R> {
    /// Wraps a registry, allowing up to `retries` extra attempts per query.
    pub const fn new(inner: R, retries: u32) -> Self {
        Self { inner, retries }
    }
}

impl<R: AssetRegistry> AssetRegistry for Retrying<R> {
    fn query(&self, category: AssetCategory) -> Result<Vec<AssetRecord>, RegistryError> {
        let mut attempt = 0;
        loop {
            match self.inner.query(category) {
                Ok(records) => return Ok(records),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!("Registry query attempt {attempt} failed, retrying: {e}");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Hands out sequence counts that are unique within this process.
///
/// [`next_sequence_count`] reads the registry and adds one, so two
/// registrations for the same (MAC, class) that run side by side can both
/// see the same count. `SequenceReservations` serialises those reads and
/// remembers the last count handed out for each key.
#[derive(Debug, Default)]
pub struct SequenceReservations {
    last: Mutex<HashMap<(AssetCategory, String, String), u32>>,
}

impl SequenceReservations {
    /// Creates an empty set of reservations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next sequence count for a (MAC, class) pair.
    ///
    /// Returns the larger of the registry's next count and one past the last
    /// count reserved for the same key.
    pub fn reserve<R: AssetRegistry + ?Sized>(
        &self,
        mac_name: &str,
        category: AssetCategory,
        class_code: &str,
        registry: &R,
    ) -> u32 {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let observed = next_sequence_count(mac_name, category, class_code, registry);
        let key = (category, mac_name.to_string(), class_code.to_string());
        let count = last
            .get(&key)
            .map_or(observed, |&reserved| observed.max(reserved.saturating_add(1)));
        last.insert(key, count);
        count
    }
}
