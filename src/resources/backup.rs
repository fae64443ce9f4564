//! Per-run, timestamp-named backup directory for displaced files.
//!
//! The directory is created once at the start of a run, receives a copy of
//! every regular file or directory that is about to be replaced by a
//! symlink, and is removed again at the end of the run if nothing was
//! displaced.
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use super::fs::copy_entry;
use crate::error::{FsOp, IoResultExt as _, LinkError};

/// Name prefix of every backup directory created under the home directory.
pub const BACKUP_PREFIX: &str = ".dotfiles_backup_";

/// Render the backup directory name for `now`, e.g.
/// `.dotfiles_backup_20250131_235959`.
#[must_use]
pub fn dir_name(now: &DateTime<Local>) -> String {
    format!("{BACKUP_PREFIX}{}", now.format("%Y%m%d_%H%M%S"))
}

/// What happened to the backup directory at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// The directory received at least one entry and was kept.
    Kept {
        /// Location of the backup directory.
        path: PathBuf,
        /// Number of top-level entries it holds.
        entries: usize,
    },
    /// The directory stayed empty and was deleted.
    Removed {
        /// Location the directory had.
        path: PathBuf,
    },
    /// No directory was created (dry run).
    NotCreated,
}

/// A backup directory exclusively owned by one link run.
#[derive(Debug)]
pub struct BackupDir {
    path: PathBuf,
    stashed: usize,
}

impl BackupDir {
    /// Create `<home>/.dotfiles_backup_<timestamp>`.
    ///
    /// A directory created earlier in the same second is reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(home: &Path, now: &DateTime<Local>) -> Result<Self, LinkError> {
        let path = home.join(dir_name(now));
        std::fs::create_dir_all(&path).fs_op(FsOp::CreateDir, &path)?;
        Ok(Self { path, stashed: 0 })
    }

    /// Location of the backup directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries copied in during this run.
    #[must_use]
    pub const fn stashed(&self) -> usize {
        self.stashed
    }

    /// Copy `target` into the backup directory under its base name.
    ///
    /// A later entry with the same base name overwrites the earlier copy.
    /// Returns the path of the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` has no file name, is a special file, or
    /// cannot be copied.
    pub fn stash(&mut self, target: &Path) -> Result<PathBuf, LinkError> {
        let name = target.file_name().ok_or_else(|| {
            LinkError::fs(
                FsOp::Copy,
                target,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
        let dest = self.path.join(name);
        copy_entry(target, &dest)?;
        self.stashed += 1;
        Ok(dest)
    }

    /// Remove the directory if its listing is empty, otherwise keep it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or removed.
    pub fn finish(self) -> Result<BackupOutcome, LinkError> {
        let entries = std::fs::read_dir(&self.path)
            .fs_op(FsOp::ListDir, &self.path)?
            .count();
        if entries == 0 {
            std::fs::remove_dir(&self.path).fs_op(FsOp::Remove, &self.path)?;
            Ok(BackupOutcome::Removed { path: self.path })
        } else {
            Ok(BackupOutcome::Kept {
                path: self.path,
                entries,
            })
        }
    }

    /// Best-effort removal of the directory if it is still empty; used when a
    /// run aborts so failed runs do not leave empty directories behind.
    pub(crate) fn discard_if_empty(&self) {
        let empty = std::fs::read_dir(&self.path).is_ok_and(|mut it| it.next().is_none());
        if empty {
            let _ = std::fs::remove_dir(&self.path);
        }
    }
}
