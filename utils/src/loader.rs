use std::collections::HashSet;
use std::fs;
use std::path::Path;

use flowsync_defs::{resource_name, ResourceKind, SyncError};
use serde_json::Value;

/// Reads the desired-state document and returns the definitions listed under
/// the section of `kind`.
pub fn load_desired_state(path: &Path, kind: ResourceKind) -> Result<Vec<Value>, SyncError> {
    let content = fs::read_to_string(path).map_err(|e| {
        SyncError::Config(format!(
            "Failed to read desired-state file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_desired_state(&content, kind, &path.display().to_string())
}

pub fn parse_desired_state(
    content: &str,
    kind: ResourceKind,
    origin: &str,
) -> Result<Vec<Value>, SyncError> {
    let section = kind.section_key().ok_or_else(|| {
        SyncError::Config(format!(
            "{}s are not declared in a desired-state document",
            kind
        ))
    })?;

    if content.trim().is_empty() {
        return Err(SyncError::Config(format!("{} is empty", origin)));
    }

    let document: Value = serde_yaml::from_str(content).map_err(|e| SyncError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })?;

    let entries = match document.get(section) {
        Some(Value::Array(entries)) => entries.clone(),
        // `deployments:` with nothing below it
        Some(Value::Null) => vec![],
        Some(_) => {
            return Err(SyncError::Config(format!(
                "'{}' in {} must be a list",
                section, origin
            )))
        }
        None => {
            return Err(SyncError::Config(format!(
                "{} has no top-level '{}' key",
                origin, section
            )))
        }
    };

    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            return Err(SyncError::Config(format!(
                "Entry #{} of '{}' in {} is not a mapping",
                index + 1,
                section,
                origin
            )));
        }
        let name = resource_name(entry).ok_or_else(|| {
            SyncError::Config(format!(
                "Entry #{} of '{}' in {} has no name",
                index + 1,
                section,
                origin
            ))
        })?;
        if let Some(parent_field) = kind.parent_field() {
            if entry.get(parent_field).and_then(Value::as_str).is_none() {
                return Err(SyncError::Config(format!(
                    "{} '{}' in {} has no {}",
                    kind, name, origin, parent_field
                )));
            }
        }
        if !seen.insert(name.to_string()) {
            return Err(SyncError::Config(format!(
                "{} '{}' is defined more than once in {}",
                kind, name, origin
            )));
        }
    }

    Ok(entries)
}
