//! Pre-clean: remove every `.aux/` directory below a root.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use walkdir::WalkDir;

use crate::discovery::AUX_DIR_NAME;
use crate::error::Error;

/// What a pre-clean pass did.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<Error>,
}

/// Delete all auxiliary-artifact directories under `root`.
///
/// Failures are logged and collected; they never stop the walk.
pub fn clean_aux_dirs(root: &Path) -> CleanReport {
    let mut report = CleanReport::default();
    let mut walker = WalkDir::new(root).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.depth() == 0
            || !entry.file_type().is_dir()
            || entry.file_name() != AUX_DIR_NAME
        {
            continue;
        }

        walker.skip_current_dir();
        let path = entry.into_path();
        match fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                report.removed.push(path);
            }
            Err(e) => {
                let err = Error::Clean {
                    path,
                    message: e.to_string(),
                };
                error!("{}", err);
                report.failed.push(err);
            }
        }
    }

    report
}
