//! Link specification validation.
//!
//! Hard errors (absolute paths, `..` components, empty entries) are raised by
//! [`check_entries`] before any filesystem change. Softer issues are
//! collected by [`warnings`] and only logged.
use std::collections::HashSet;
use std::path::{Component, Path};

use super::LinkSpec;
use crate::error::ConfigError;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The entry that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Reject entries that would escape the repository or home directory.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEntry`] for the first entry that is empty,
/// absolute, or contains a `..` component.
pub fn check_entries(spec: &LinkSpec) -> Result<(), ConfigError> {
    for entry in spec.files.iter().chain(&spec.config_dirs) {
        check_entry(entry)?;
    }
    Ok(())
}

fn check_entry(entry: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEntry {
        entry: entry.to_string(),
        reason: reason.to_string(),
    };

    if entry.trim().is_empty() {
        return Err(invalid("entry is empty"));
    }
    let path = Path::new(entry);
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(invalid("must be relative to the repository root"));
            }
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    if path.file_name().is_none() {
        return Err(invalid("does not name a file or directory"));
    }
    Ok(())
}

/// Collect non-fatal issues: duplicates, entries listed in both sections, and
/// sources missing from the repository.
#[must_use]
pub fn warnings(spec: &LinkSpec, root: &Path) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_files = HashSet::new();
    for entry in &spec.files {
        if !seen_files.insert(entry.as_str()) {
            warnings.push(ValidationWarning::new(entry, "listed more than once in files"));
        }
    }

    let mut seen_dirs = HashSet::new();
    for entry in &spec.config_dirs {
        if !seen_dirs.insert(entry.as_str()) {
            warnings.push(ValidationWarning::new(
                entry,
                "listed more than once in config_dirs",
            ));
        }
        if seen_files.contains(entry.as_str()) {
            warnings.push(ValidationWarning::new(
                entry,
                "listed in both files and config_dirs",
            ));
        }
    }

    for entry in spec.files.iter().chain(&spec.config_dirs) {
        if !root.join(entry).exists() {
            warnings.push(ValidationWarning::new(
                entry,
                "source does not exist in repository, will be skipped",
            ));
        }
    }

    warnings
}
