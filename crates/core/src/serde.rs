//! Serde helper functions for request deserialization.
//!
//! Clients routinely send blank strings for fields they left empty, and
//! partial updates need to tell "field omitted" apart from "field set to
//! null". These helpers normalize both cases.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, trimming it and treating blank strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.and_then(non_blank))
}

/// Deserialize a nullable field of a partial update.
///
/// Use together with `#[serde(default)]`: an omitted field stays `None`,
/// an explicit `null` or blank string becomes `Some(None)` and any other
/// string becomes `Some(Some(trimmed))`.
pub fn deserialize_nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(s.and_then(non_blank)))
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}
