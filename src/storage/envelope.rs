//! The JSON envelope the web backend wraps collections in:
//!
//! ```json
//! { "success": true, "vehicles": [ { "id": 1, "department": "..." } ] }
//! ```
//!
//! The collection key is the category's [collection
//! name](crate::AssetCategory::collection).

use serde_json::{Map, Value};

use crate::domain::{AssetRecord, catalog::AssetCategory};

/// Errors that can occur while decoding an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The input is not valid JSON, or a record is malformed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an object.
    #[error("expected a JSON object")]
    NotAnObject,

    /// The envelope does not report success.
    #[error("envelope does not report success")]
    Unsuccessful,

    /// The envelope lacks the collection's array.
    #[error("envelope has no '{0}' array")]
    MissingCollection(&'static str),
}

/// Decodes the records of a category from an envelope.
///
/// # Errors
///
/// Fails if the JSON is malformed, `success` is missing or not `true`, or the
/// collection array is absent.
pub fn decode(category: AssetCategory, json: &str) -> Result<Vec<AssetRecord>, EnvelopeError> {
    let Value::Object(mut envelope) = serde_json::from_str::<Value>(json)? else {
        return Err(EnvelopeError::NotAnObject);
    };

    if envelope.get("success") != Some(&Value::Bool(true)) {
        return Err(EnvelopeError::Unsuccessful);
    }

    let collection = category.collection();
    let records = envelope
        .remove(collection)
        .ok_or(EnvelopeError::MissingCollection(collection))?;

    Ok(serde_json::from_value(records)?)
}

/// Encodes the records of a category as a successful envelope.
///
/// # Errors
///
/// Fails if a record cannot be represented as JSON.
pub fn encode(category: AssetCategory, records: &[AssetRecord]) -> Result<String, EnvelopeError> {
    let mut envelope = Map::new();
    envelope.insert("success".to_string(), Value::Bool(true));
    envelope.insert(category.collection().to_string(), serde_json::to_value(records)?);
    Ok(serde_json::to_string_pretty(&envelope)?)
}
