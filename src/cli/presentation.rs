//! CLI presentation: render search results as text or JSON.

use crate::error::ApiError;
use crate::types::Entry;
use serde_json::json;

/// Aligned key/value block for a found entry.
pub fn format_entry_text(entry: &Entry) -> String {
    [
        format!("revision  {}", entry.revision),
        format!("path      {}", entry.path),
        format!("mode      {}", entry.mode),
        format!("type      {}", entry.kind),
        format!("hash      {}", entry.hash),
    ]
    .join("\n")
}

/// JSON document for a search result; `entry` is absent when nothing matched.
pub fn format_entry_json(entry: Option<&Entry>) -> Result<String, ApiError> {
    let value = json!({
        "found": entry.is_some(),
        "entry": entry,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize output: {}", e)))
}

pub fn format_exists(exists: bool) -> String {
    exists.to_string()
}
