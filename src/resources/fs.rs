//! File-system resource helpers.
use std::path::Path;

use crate::error::{FsOp, IoResultExt as _, LinkError};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), LinkError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).fs_op(FsOp::CreateDir, parent)?;
    }
    Ok(())
}

/// Returns `true` if anything (including a dangling symlink) exists at `path`.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Copy a regular file, directory tree, or symlink from `src` to `dst`
/// without following `src` itself.
///
/// Symlinks inside a copied tree are recreated as symlinks rather than
/// followed. An existing `dst` is replaced.
///
/// # Errors
///
/// Returns [`LinkError::UnsupportedNode`] for FIFOs, sockets, and device
/// nodes, and a filesystem error if any read, copy, or create fails.
pub fn copy_entry(src: &Path, dst: &Path) -> Result<(), LinkError> {
    let meta = std::fs::symlink_metadata(src).fs_op(FsOp::Inspect, src)?;
    if entry_exists(dst) {
        remove_path(dst)?;
    }

    let file_type = meta.file_type();
    if file_type.is_symlink() {
        let target = std::fs::read_link(src).fs_op(FsOp::ReadLink, src)?;
        create_symlink(&target, dst)
    } else if file_type.is_dir() {
        copy_dir_recursive(src, dst)
    } else if file_type.is_file() {
        std::fs::copy(src, dst).fs_op(FsOp::Copy, src)?;
        Ok(())
    } else {
        Err(LinkError::UnsupportedNode {
            path: src.to_path_buf(),
        })
    }
}

/// Recursively copy a directory tree, recreating nested symlinks as links.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), LinkError> {
    std::fs::create_dir_all(dst).fs_op(FsOp::CreateDir, dst)?;
    for entry in std::fs::read_dir(src).fs_op(FsOp::ListDir, src)? {
        let entry = entry.fs_op(FsOp::ListDir, src)?;
        copy_entry(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

/// Remove whatever lives at `path` without following a final symlink:
/// symlinks and files are unlinked, real directories removed recursively.
///
/// # Errors
///
/// Returns an error if the path cannot be inspected or removed.
pub fn remove_path(path: &Path) -> Result<(), LinkError> {
    let meta = std::fs::symlink_metadata(path).fs_op(FsOp::Inspect, path)?;
    if meta.file_type().is_symlink() {
        remove_symlink(path)
    } else if meta.is_dir() {
        std::fs::remove_dir_all(path).fs_op(FsOp::Remove, path)
    } else {
        std::fs::remove_file(path).fs_op(FsOp::Remove, path)
    }
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created.
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), LinkError> {
    std::os::unix::fs::symlink(target, link).fs_op(FsOp::Symlink, link)
}

/// Create a symlink at `link` pointing to `target`.
///
/// Directory targets need `symlink_dir`; everything else uses `symlink_file`.
///
/// # Errors
///
/// Returns an error if the link cannot be created.
#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), LinkError> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link).fs_op(FsOp::Symlink, link)
    } else {
        std::os::windows::fs::symlink_file(target, link).fs_op(FsOp::Symlink, link)
    }
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir` (not
/// `remove_file`), and `symlink_metadata().is_dir()` is `false` for them, so
/// the raw `FILE_ATTRIBUTE_DIRECTORY` flag decides.
///
/// # Errors
///
/// Returns an error if the path cannot be inspected or removed.
pub fn remove_symlink(path: &Path) -> Result<(), LinkError> {
    let meta = std::fs::symlink_metadata(path).fs_op(FsOp::Inspect, path)?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path).fs_op(FsOp::Remove, path)
    } else {
        std::fs::remove_file(path).fs_op(FsOp::Remove, path)
    }
}

#[cfg(windows)]
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
}

#[cfg(not(windows))]
const fn is_dir_like(_meta: &std::fs::Metadata) -> bool {
    // Unix symlinks are always unlinked with remove_file.
    false
}
