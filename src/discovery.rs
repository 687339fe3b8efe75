//! # Task Discovery
//!
//! Walks a directory tree and turns every main `.tex` file into a
//! [`BuildTask`].
//!
//! `.git` and `.aux` directories are pruned before descent, so nothing
//! below them is ever read. Entries are visited in file-name order, which
//! makes the task list deterministic for an unchanged tree. Discovery only
//! reads files; it never runs the build tool.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classify::{detect_engine, is_main_file};
use crate::task::{BuildTask, Engine, InclusionMode};

/// Recognized source file suffix.
pub const SOURCE_EXTENSION: &str = ".tex";

/// Name of the per-directory auxiliary-artifacts directory.
pub const AUX_DIR_NAME: &str = ".aux";

/// Directory names never descended into.
pub const SKIP_DIRS: &[&str] = &[".git", AUX_DIR_NAME];

fn is_pruned(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name))
}

/// Regular files and links to regular files whose name carries the source suffix.
///
/// The suffix is matched on the raw name, so names that are not valid UTF-8 still count.
fn is_source_file(entry: &DirEntry) -> bool {
    let has_suffix = entry
        .file_name()
        .as_encoded_bytes()
        .ends_with(SOURCE_EXTENSION.as_bytes());
    if !has_suffix {
        return false;
    }
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink() && entry.path().is_file()
}

/// Absolute, normalized form of `root`.
///
/// Falls back to joining onto the current directory when the path cannot be
/// canonicalized (for example because it does not exist).
pub fn normalize_root(root: &Path) -> PathBuf {
    root.canonicalize()
        .or_else(|_| std::path::absolute(root))
        .unwrap_or_else(|_| root.to_path_buf())
}

/// Find every main file below `root_dir` and describe how to build it.
///
/// Walk errors (unreadable directories, broken links) are logged and
/// skipped; they never abort discovery.
pub fn discover(root_dir: &Path, default_engine: Engine, mode: InclusionMode) -> Vec<BuildTask> {
    let root = normalize_root(root_dir);
    debug!("Discovering .tex files under {}", root.display());

    let mut tasks = Vec::new();
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_pruned(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !is_source_file(&entry) {
            continue;
        }

        let source_path = entry.path();
        if !is_main_file(source_path, mode) {
            debug!("Not a main file: {}", source_path.display());
            continue;
        }

        let Some(working_dir) = source_path.parent() else {
            continue;
        };
        let choice = detect_engine(source_path, default_engine);
        debug!(
            "Found main file {} ({})",
            source_path.display(),
            choice.engine
        );

        tasks.push(BuildTask {
            source_path: source_path.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
            engine: choice.engine,
            detection_note: choice.note,
        });
    }

    tasks
}
