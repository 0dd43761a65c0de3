//! Shared lockfile discovery helpers
//!
//! Walks up the directory tree looking for any of a list of lockfile names.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Find the nearest matching file by walking up from the current directory.
///
/// `filenames` are checked in order at each directory level.
pub fn find_nearest_file(filenames: &[String]) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_nearest_file_from(&cwd, filenames)
}

/// Find the nearest matching file by walking up from a start directory.
pub fn find_nearest_file_from(start: &Path, filenames: &[String]) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let found = filenames
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file());
        if let Some(path) = found {
            debug!(path = %path.display(), "found lockfile");
            return Some(path);
        }
    }

    debug!(start = %start.display(), ?filenames, "no lockfile found");
    None
}
