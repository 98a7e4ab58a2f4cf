// src/build/layout.rs

use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, SwellError};

/// Permissions for a freshly created package directory.
pub const PACKAGE_DIR_MODE: u32 = 0o755;

/// Create `package_path` (with parents) and return its
/// `(build_dir, source_dir)` pair: `<package_path>/build` and
/// `<package_path>/source`, without trailing separators.
///
/// Existing directories are left alone, so calling this repeatedly with the
/// same root returns the same pair and has no further effect.
pub fn build_and_source_dirs(package_path: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
    let package_path = package_path.as_ref();

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PACKAGE_DIR_MODE);
    }
    builder
        .create(package_path)
        .map_err(|e| SwellError::fs("creating package directory", package_path, e))?;

    let build_dir = strip_trailing_separator(&package_path.join("build"));
    let source_dir = strip_trailing_separator(&package_path.join("source"));

    debug!(build = ?build_dir, source = ?source_dir, "package layout");
    Ok((build_dir, source_dir))
}

/// Drop trailing `/` characters (but never reduce `/` itself to nothing).
pub fn strip_trailing_separator(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches(std::path::MAIN_SEPARATOR);
    if trimmed.is_empty() || trimmed.len() == s.len() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
