//! Domain-specific error types for the dotfile linker.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Library modules return typed errors ([`ConfigError`], [`LinkError`]) while
//! command handlers at the CLI boundary convert them to [`anyhow::Error`]
//! via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotlinkError
//! ├── Config(ConfigError) : links.toml parsing, entry validation, root/home lookup
//! └── Link(LinkError)     : copy/remove/symlink failures while linking
//! ```
//!
//! A missing source file is deliberately absent from this hierarchy: it is a
//! soft condition reported as [`LinkResult::Skipped`](crate::resources::LinkResult::Skipped).

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Top-level error type for the dotfile linker.
#[derive(Error, Debug)]
pub enum DotlinkError {
    /// Configuration-related error (parsing, validation, path resolution).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem error raised while linking, unlinking, or backing up.
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
}

/// Errors that arise from loading and validating the link specification.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An entry in the link specification is not a usable relative path.
    #[error("Invalid entry '{entry}': {reason}")]
    InvalidEntry {
        /// The offending entry as written in the configuration.
        entry: String,
        /// Why the entry was rejected.
        reason: String,
    },

    /// The configuration file exists but could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Read {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a link specification.
    #[error("Invalid TOML in {}: {message}", .path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Neither `HOME` nor `USERPROFILE` is set and no `--home` was given.
    #[error("cannot determine home directory; use --home or set HOME")]
    HomeNotSet,

    /// The repository root could not be located.
    #[error("cannot determine repository root; use --root or set DOTLINK_ROOT")]
    RootNotFound,
}

/// Filesystem operation that failed, used to label [`LinkError::Filesystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    /// Reading metadata of a path without following symlinks.
    Inspect,
    /// Copying a file or tree into (or out of) the backup directory.
    Copy,
    /// Removing a file, directory, or symlink.
    Remove,
    /// Creating a directory and its ancestors.
    CreateDir,
    /// Creating a symbolic link.
    Symlink,
    /// Listing a directory.
    ListDir,
    /// Reading the target of a symbolic link.
    ReadLink,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Inspect => "inspect",
            Self::Copy => "copy",
            Self::Remove => "remove",
            Self::CreateDir => "create directory",
            Self::Symlink => "create symlink",
            Self::ListDir => "list directory",
            Self::ReadLink => "read link",
        };
        f.write_str(s)
    }
}

/// Hard errors raised by the linker. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum LinkError {
    /// A filesystem operation failed on `path`.
    #[error("{op} failed for {}: {source}", .path.display())]
    Filesystem {
        /// The operation that failed.
        op: FsOp,
        /// The offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A destination is a FIFO, socket, or device node that cannot be backed up.
    #[error("cannot back up special file: {}", .path.display())]
    UnsupportedNode {
        /// Path of the special file.
        path: PathBuf,
    },
}

impl LinkError {
    /// Build a [`LinkError::Filesystem`] for `op` on `path`.
    #[must_use]
    pub fn fs(op: FsOp, path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The path the failing operation was applied to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Filesystem { path, .. } | Self::UnsupportedNode { path } => path,
        }
    }
}

/// Extension for attaching an [`FsOp`] and path to a raw `io::Result`.
pub(crate) trait IoResultExt<T> {
    /// Convert the error into a [`LinkError::Filesystem`].
    fn fs_op(self, op: FsOp, path: &Path) -> Result<T, LinkError>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn fs_op(self, op: FsOp, path: &Path) -> Result<T, LinkError> {
        self.map_err(|e| LinkError::fs(op, path, e))
    }
}
