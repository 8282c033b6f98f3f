//! Alt text for assets, keyed by the stringified index.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{RaccError, Result};

/// Description returned when an index has no entry.
pub const DEFAULT_ALT: &str = "a raccoon";

/// Read-only index → description map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltTextTable {
    entries: HashMap<String, String>,
}

impl AltTextTable {
    /// Load a JSON object of `{"<index>": "<description>"}` from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RaccError::Config {
            path: path.to_path_buf(),
            reason: format!("reading alt text: {e}"),
        })?;
        Self::from_json(&content).map_err(|e| match e {
            RaccError::Config { reason, .. } => RaccError::Config {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_str(content).map_err(|e| RaccError::Config {
                path: Default::default(),
                reason: format!("parsing alt text: {e}"),
            })?;
        Ok(Self { entries })
    }

    /// Load, or log the failure and fall back to an empty table.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => {
                tracing::info!(path = %path.display(), entries = table.len(), "Loaded alt text");
                table
            }
            Err(err) => {
                tracing::warn!(error = %err, "Could not load alt text, using default response");
                Self::default()
            }
        }
    }

    pub fn get(&self, index: &str) -> &str {
        self.entries.get(index).map(String::as_str).unwrap_or(DEFAULT_ALT)
    }

    pub fn get_index(&self, index: u32) -> &str {
        self.get(&index.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AltTextTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
