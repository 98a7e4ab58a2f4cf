// tests/build_layout.rs
mod common;
use crate::common::init_tracing;

use std::fs;
use std::path::PathBuf;

use swell_core::build::layout::strip_trailing_separator;
use swell_core::build::{build_and_source_dirs, link_path, PreviousTarget};

#[test]
fn build_and_source_dirs_creates_root_and_returns_pair() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("jedi_bundle");

    let (build, source) = build_and_source_dirs(&package).unwrap();

    assert!(package.is_dir());
    assert_eq!(build, package.join("build"));
    assert_eq!(source, package.join("source"));
}

#[test]
fn build_and_source_dirs_is_idempotent() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("a").join("b").join("pkg");

    let first = build_and_source_dirs(&package).unwrap();
    fs::write(package.join("marker"), "x").unwrap();
    let second = build_and_source_dirs(&package).unwrap();

    assert_eq!(first, second);
    assert!(package.join("marker").exists());
}

#[test]
fn build_and_source_dirs_ignores_trailing_separator() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("pkg");
    let with_slash = PathBuf::from(format!("{}/", package.display()));

    let (build, source) = build_and_source_dirs(&with_slash).unwrap();

    assert_eq!(build, package.join("build"));
    assert_eq!(source, package.join("source"));
    assert!(!build.to_string_lossy().ends_with('/'));
}

#[test]
fn strip_trailing_separator_keeps_root() {
    assert_eq!(strip_trailing_separator(&PathBuf::from("/")), PathBuf::from("/"));
    assert_eq!(
        strip_trailing_separator(&PathBuf::from("pkg/build/")),
        PathBuf::from("pkg/build")
    );
}

#[cfg(unix)]
#[test]
fn new_package_directory_gets_standard_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("pkg");
    build_and_source_dirs(&package).unwrap();

    // The process umask can only clear bits.
    let mode = fs::metadata(&package).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode & !0o755, 0);
    assert_ne!(mode & 0o700, 0);
}

#[cfg(unix)]
#[test]
fn link_into_empty_target() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src_dir");
    fs::create_dir(&source).unwrap();
    let target = dir.path().join("link");

    let previous = link_path(&source, &target).unwrap();

    assert_eq!(previous, PreviousTarget::Absent);
    assert_eq!(fs::read_link(&target).unwrap(), source);
}

#[cfg(unix)]
#[test]
fn link_replaces_existing_symlink_but_not_its_destination() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let old = dir.path().join("old");
    let new = dir.path().join("new");
    fs::create_dir(&old).unwrap();
    fs::write(old.join("data"), "old data").unwrap();
    fs::create_dir(&new).unwrap();
    let target = dir.path().join("link");
    std::os::unix::fs::symlink(&old, &target).unwrap();

    let previous = link_path(&new, &target).unwrap();

    assert_eq!(previous, PreviousTarget::Symlink);
    assert_eq!(fs::read_link(&target).unwrap(), new);
    assert_eq!(fs::read_to_string(old.join("data")).unwrap(), "old data");
}

#[cfg(unix)]
#[test]
fn link_replaces_dangling_symlink() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("link");
    std::os::unix::fs::symlink(dir.path().join("gone"), &target).unwrap();
    let source = dir.path().join("real");
    fs::create_dir(&source).unwrap();

    assert_eq!(link_path(&source, &target).unwrap(), PreviousTarget::Symlink);
    assert_eq!(fs::read_link(&target).unwrap(), source);
}

#[cfg(unix)]
#[test]
fn link_replaces_directory_tree() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("fv3-jedi");
    fs::create_dir_all(target.join("nested").join("deeper")).unwrap();
    fs::write(target.join("nested").join("deeper").join("file.txt"), "x").unwrap();
    fs::write(target.join("top.txt"), "y").unwrap();
    let source = dir.path().join("shared").join("fv3-jedi");
    fs::create_dir_all(&source).unwrap();

    let previous = link_path(&source, &target).unwrap();

    assert_eq!(previous, PreviousTarget::Directory);
    assert!(fs::symlink_metadata(&target).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&target).unwrap(), source);
}

#[cfg(unix)]
#[test]
fn link_replaces_regular_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("CMakeLists.txt");
    fs::write(&target, "old").unwrap();
    let source = dir.path().join("CMakeLists.real.txt");
    fs::write(&source, "new").unwrap();

    let previous = link_path(&source, &target).unwrap();

    assert_eq!(previous, PreviousTarget::File);
    assert_eq!(fs::read_to_string(&target).unwrap(), "new");
}

#[cfg(unix)]
#[test]
fn link_to_missing_source_still_creates_link() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("not-built-yet");
    let target = dir.path().join("link");

    link_path(&source, &target).unwrap();

    assert_eq!(fs::read_link(&target).unwrap(), source);
    assert!(!target.exists());
}

#[cfg(unix)]
#[test]
fn relinking_same_pair_is_stable() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src");
    fs::create_dir(&source).unwrap();
    let target = dir.path().join("link");

    link_path(&source, &target).unwrap();
    let previous = link_path(&source, &target).unwrap();

    assert_eq!(previous, PreviousTarget::Symlink);
    assert_eq!(fs::read_link(&target).unwrap(), source);
    assert!(source.is_dir());
}
