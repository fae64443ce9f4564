//! Symlink resource: one repository path mirrored into the home directory.
use std::path::{Component, Path, PathBuf};

use super::backup::BackupDir;
use super::fs::{
    copy_entry, create_symlink, ensure_parent_dir, entry_exists, remove_path, remove_symlink,
};
use super::{LinkResult, Resource, ResourceState, UnlinkResult};
use crate::error::{FsOp, LinkError};

/// Which list of the link specification an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A plain file entry; its destination parent must already exist.
    File,
    /// A configuration directory; its destination parent is created first.
    ConfigDir,
}

/// A symlink resource that can be checked, applied, and removed.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The entry as written in the link specification.
    pub entry: String,
    /// Which list the entry came from.
    pub kind: EntryKind,
    /// Absolute path inside the repository (what the symlink points to).
    pub source: PathBuf,
    /// Path inside the home directory (where the symlink is created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Build the resource for `entry`, joining it onto `root` and `home`.
    ///
    /// The entry is rebuilt from its components first, so `./` prefixes and
    /// trailing separators are dropped. A trailing separator would otherwise
    /// make every lookup follow a symlink at the destination.
    #[must_use]
    pub fn new(root: &Path, home: &Path, entry: &str, kind: EntryKind) -> Self {
        let rel = normalize_entry(entry);
        Self {
            entry: entry.to_string(),
            kind,
            source: root.join(&rel),
            target: home.join(&rel),
        }
    }

    /// Decide what [`apply`](Self::apply) would do, without touching anything.
    ///
    /// The source is checked following symlinks; the destination is checked
    /// without following them, so a dangling symlink counts as a symlink.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination exists but cannot be inspected.
    pub fn classify(&self) -> Result<LinkResult, LinkError> {
        if !self.source.exists() {
            return Ok(LinkResult::Skipped);
        }
        match std::fs::symlink_metadata(&self.target) {
            Ok(meta) if meta.file_type().is_symlink() => Ok(LinkResult::SymlinkReplaced),
            Ok(_) if self.resolves_to_source() => Ok(LinkResult::Covered),
            Ok(_) => Ok(LinkResult::BackedUpAndLinked),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LinkResult::Linked),
            Err(e) => Err(LinkError::fs(FsOp::Inspect, &self.target, e)),
        }
    }

    /// Replace the destination with a symlink to the source.
    ///
    /// Pre-existing files and directories are copied into `backup` before
    /// removal; pre-existing symlinks are removed without backup.
    ///
    /// # Errors
    ///
    /// Returns the first filesystem error; nothing is rolled back.
    pub fn apply(&self, backup: &mut BackupDir) -> Result<LinkResult, LinkError> {
        if self.kind == EntryKind::ConfigDir {
            ensure_parent_dir(&self.target)?;
        }

        let result = self.classify()?;
        match result {
            LinkResult::Skipped | LinkResult::Covered => return Ok(result),
            LinkResult::BackedUpAndLinked => {
                backup.stash(&self.target)?;
                remove_path(&self.target)?;
            }
            LinkResult::SymlinkReplaced => remove_symlink(&self.target)?,
            LinkResult::Linked => {}
        }

        create_symlink(&self.source, &self.target)?;
        Ok(result)
    }

    /// Whether the destination is a symlink pointing at the source.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        std::fs::read_link(&self.target).is_ok_and(|existing| paths_equal(&existing, &self.source))
    }

    /// Remove our symlink, optionally copying the original back from
    /// `restore_from` (a backup directory holding it under its base name).
    ///
    /// Destinations that are not our symlink are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the symlink cannot be removed or the backup copy
    /// cannot be restored.
    pub fn remove(&self, restore_from: Option<&Path>) -> Result<UnlinkResult, LinkError> {
        if !self.is_linked() {
            return Ok(UnlinkResult::NotLinked);
        }
        remove_symlink(&self.target)?;

        if let Some(saved) = self.backup_copy(restore_from) {
            copy_entry(&saved, &self.target)?;
            return Ok(UnlinkResult::Restored);
        }
        Ok(UnlinkResult::Removed)
    }

    /// The copy of this entry inside `backup_dir`, if one exists.
    #[must_use]
    pub fn backup_copy(&self, backup_dir: Option<&Path>) -> Option<PathBuf> {
        let saved = backup_dir?.join(self.target.file_name()?);
        entry_exists(&saved).then_some(saved)
    }

    /// Whether the destination is a real path that already resolves to the
    /// source through a symlinked ancestor.
    fn resolves_to_source(&self) -> bool {
        match (
            dunce::canonicalize(&self.target),
            dunce::canonicalize(&self.source),
        ) {
            (Ok(target), Ok(source)) => target == source,
            _ => false,
        }
    }
}

impl Resource for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn current_state(&self) -> Result<ResourceState, LinkError> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        if let Ok(existing) = std::fs::read_link(&self.target) {
            return Ok(if paths_equal(&existing, &self.source) {
                ResourceState::Correct
            } else {
                ResourceState::Incorrect {
                    current: format!("points to {}", existing.display()),
                }
            });
        }

        match std::fs::symlink_metadata(&self.target) {
            Ok(_) if self.resolves_to_source() => Ok(ResourceState::Correct),
            Ok(meta) if meta.is_dir() => Ok(ResourceState::Incorrect {
                current: "target is a directory".to_string(),
            }),
            Ok(_) => Ok(ResourceState::Incorrect {
                current: "target is a regular file".to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => Err(LinkError::fs(FsOp::Inspect, &self.target, e)),
        }
    }
}

fn normalize_entry(entry: &str) -> PathBuf {
    Path::new(entry)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Compare two paths for equality, handling UNC prefix normalization on Windows.
fn paths_equal(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        #[cfg(windows)]
        {
            let s = p.to_string_lossy();
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                return PathBuf::from(stripped);
            }
        }
        p.to_path_buf()
    };

    normalize(a) == normalize(b)
}
