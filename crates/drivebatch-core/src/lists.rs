//! File and ID list ingestion.
//!
//! Input files are accepted in three forms, tried in order:
//! 1. a JSON array of strings
//! 2. a JSON object with a non-empty `files` / `ids` array
//! 3. line-oriented text; blank lines and `#` comments are skipped
//!
//! The first form that parses wins. Existing input files depend on this order.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;

/// Named array field looked up in the JSON object form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Files,
    Ids,
}

impl ListField {
    pub fn key(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Ids => "ids",
        }
    }
}

/// Parse list content
pub fn parse_list(content: &str, field: ListField) -> Vec<String> {
    if let Ok(entries) = serde_json::from_str::<Vec<String>>(content) {
        return entries;
    }

    if let Some(entries) = object_field(content, field)
        && !entries.is_empty()
    {
        return entries;
    }

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn object_field(content: &str, field: ListField) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(content).ok()?;
    let array = value.as_object()?.get(field.key())?;
    serde_json::from_value(array.clone()).ok()
}

/// Load local file paths from a list file
pub async fn load_file_list(path: &Path) -> Result<Vec<String>> {
    load(path, ListField::Files, "file list").await
}

/// Load remote identifiers from a list file
pub async fn load_id_list(path: &Path) -> Result<Vec<String>> {
    load(path, ListField::Ids, "ID list").await
}

async fn load(path: &Path, field: ListField, what: &str) -> Result<Vec<String>> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        Error::invalid_argument(format!(
            "Failed to read {} {}: {}",
            what,
            path.display(),
            e
        ))
    })?;

    let content = String::from_utf8(data)
        .map_err(|e| Error::parse_error(format!("Failed to parse {}: {}", what, e)))?;

    let entries = parse_list(&content, field);
    log::debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}
