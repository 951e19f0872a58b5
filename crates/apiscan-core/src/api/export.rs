//! Serialization of extracted units
//!
//! Three externally required encodings of the same sparse structure: pretty
//! JSON with alphabetically sorted keys, minified JSON, and a compact
//! MessagePack map. Unpopulated attributes are omitted everywhere, never
//! emitted as null.

use thiserror::Error;

use super::types::ApiUnit;

/// Serialization failure
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encoding failed: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),
}

impl ApiUnit {
    /// Flatten the unit into its exported value tree.
    ///
    /// `serde_json` maps are key-ordered, so the result is deterministic and
    /// directly comparable.
    pub fn export(&self) -> Result<serde_json::Value, ExportError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to JSON: pretty with sorted keys and two-space indent, or
    /// minified
    pub fn to_json(&self, pretty: bool) -> Result<String, ExportError> {
        if pretty {
            Ok(serde_json::to_string_pretty(&self.export()?)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }

    /// Serialize to the binary MessagePack map encoding
    pub fn to_msgpack(&self) -> Result<Vec<u8>, ExportError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }
}
