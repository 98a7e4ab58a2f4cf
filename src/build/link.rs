// src/build/link.rs

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{Result, SwellError};

/// What occupied a link target before it was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousTarget {
    Absent,
    Symlink,
    Directory,
    File,
}

/// Make `target` a symbolic link to `source`, whatever is there now.
///
/// - an existing symlink is removed (its destination is never touched)
/// - a real directory is removed with its whole subtree
/// - a regular file is removed
/// - nothing there: nothing to remove
///
/// The removal is not rolled back if creating the new link fails; that case
/// is reported as an error naming both paths, since `target` is then gone.
/// Not safe against a concurrent caller working on the same `target`.
pub fn link_path(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<PreviousTarget> {
    let source = source.as_ref();
    let target = target.as_ref();

    let previous = remove_existing(target)?;

    create_symlink(source, target).map_err(|e| {
        let action = match previous {
            PreviousTarget::Absent => "creating symlink".to_string(),
            other => format!(
                "creating symlink to {:?} (previous {:?} at target was already removed)",
                source, other
            ),
        };
        SwellError::fs(action, target, e)
    })?;

    info!(source = ?source, target = ?target, ?previous, "linked path");
    Ok(previous)
}

fn remove_existing(target: &Path) -> Result<PreviousTarget> {
    // symlink_metadata does not follow the link.
    let meta = match fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PreviousTarget::Absent),
        Err(e) => return Err(SwellError::fs("inspecting link target", target, e)),
    };

    let file_type = meta.file_type();
    if file_type.is_symlink() {
        debug!(target = ?target, "removing existing symlink");
        remove_symlink(target).map_err(|e| SwellError::fs("removing symlink", target, e))?;
        Ok(PreviousTarget::Symlink)
    } else if file_type.is_dir() {
        debug!(target = ?target, "removing existing directory tree");
        fs::remove_dir_all(target)
            .map_err(|e| SwellError::fs("removing directory", target, e))?;
        Ok(PreviousTarget::Directory)
    } else {
        debug!(target = ?target, "removing existing file");
        fs::remove_file(target).map_err(|e| SwellError::fs("removing file", target, e))?;
        Ok(PreviousTarget::File)
    }
}

#[cfg(unix)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn create_symlink(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

#[cfg(unix)]
fn remove_symlink(target: &Path) -> io::Result<()> {
    fs::remove_file(target)
}

#[cfg(windows)]
fn remove_symlink(target: &Path) -> io::Result<()> {
    // Directory symlinks on Windows must be removed as directories.
    fs::remove_file(target).or_else(|_| fs::remove_dir(target))
}
