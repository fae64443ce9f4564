//! Link specification loading.
//!
//! The set of paths to mirror into the home directory is read from
//! `links.toml` at the repository root (or an explicit `--config` file).
//! When no file exists the compiled-in [`LinkSpec::builtin`] list is used.
pub mod toml_loader;
pub mod validation;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File name of the link specification at the repository root.
pub const LINKS_FILE: &str = "links.toml";

/// Which repository-relative paths are mirrored into the home directory.
///
/// Both lists are processed in order, files first. Duplicates are permitted
/// and only cause redundant work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSpec {
    /// Individual files, e.g. `.zshrc`.
    pub files: Vec<String>,
    /// Configuration directories whose parent may not exist yet, e.g. `.config/mise`.
    pub config_dirs: Vec<String>,
}

impl LinkSpec {
    /// Create a spec from explicit file and config-directory lists.
    #[must_use]
    pub fn new<F, D>(files: F, config_dirs: D) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            config_dirs: config_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// The compiled-in default used when no `links.toml` is present.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(
            [
                ".zshrc",
                ".zprofile",
                ".gitconfig",
                ".gitignore_global",
                ".vimrc",
                ".tmux.conf",
            ],
            [".config/mise"],
        )
    }

    /// Total number of entries across both lists.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.files.len() + self.config_dirs.len()
    }

    /// Whether both lists are empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.files.is_empty() && self.config_dirs.is_empty()
    }
}

/// On-disk layout of `links.toml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinksFile {
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    config_dirs: Vec<String>,
    #[serde(default = "default_optional_tools")]
    optional_tools: Vec<String>,
}

fn default_optional_tools() -> Vec<String> {
    vec!["mise".to_string()]
}

/// Where the active link specification came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// Parsed from this file.
    File(PathBuf),
    /// The compiled-in default list.
    Builtin,
}

/// All loaded configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute repository root that link targets point into.
    pub root: PathBuf,
    /// Origin of [`Config::spec`].
    pub source: SpecSource,
    /// Paths to link.
    pub spec: LinkSpec,
    /// Tools probed on `PATH` before linking; absence is never fatal.
    pub optional_tools: Vec<String>,
}

impl Config {
    /// Load the link specification for `root`.
    ///
    /// `override_path` replaces `<root>/links.toml`. A missing file falls back
    /// to [`LinkSpec::builtin`]; every entry is validated before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// any entry is not a plain relative path.
    pub fn load(root: &Path, override_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = override_path.map_or_else(|| root.join(LINKS_FILE), Path::to_path_buf);

        let (source, spec, optional_tools) = match toml_loader::load_config::<LinksFile>(&path)? {
            Some(file) => (
                SpecSource::File(path),
                LinkSpec {
                    files: file.files,
                    config_dirs: file.config_dirs,
                },
                file.optional_tools,
            ),
            None => (SpecSource::Builtin, LinkSpec::builtin(), default_optional_tools()),
        };

        validation::check_entries(&spec)?;

        Ok(Self {
            root: root.to_path_buf(),
            source,
            spec,
            optional_tools,
        })
    }

    /// Build a configuration directly from a spec (no file access).
    #[must_use]
    pub fn from_spec(root: &Path, spec: LinkSpec) -> Self {
        Self {
            root: root.to_path_buf(),
            source: SpecSource::Builtin,
            spec,
            optional_tools: Vec::new(),
        }
    }
}
