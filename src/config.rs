//! Column mapping for spreadsheet exports.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Maps the logical wind fields to header names in the exported CSV.
///
/// Stored as a JSON object on disk; missing keys fall back to the defaults:
/// ```json
/// {
///   "timestamp": "Start Time",
///   "speed": "Wind Speed avg",
///   "direction": "Wind Dir. avg"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub timestamp: String,
    pub speed: String,
    pub direction: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            timestamp: "Start Time".to_string(),
            speed: "Wind Speed avg".to_string(),
            direction: "Wind Dir. avg".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Loads the mapping from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading column config {path}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Iterates over all `(field, header)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("timestamp", self.timestamp.as_str()),
            ("speed", self.speed.as_str()),
            ("direction", self.direction.as_str()),
        ]
        .into_iter()
    }
}
