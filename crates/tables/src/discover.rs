// Historical folder enumeration

use std::path::{Path, PathBuf};

use crate::error::TableError;
use crate::format::TableFormat;

/// Regular files in `dir` with a readable table extension, sorted by file
/// name. Anything else (subfolders, other extensions) is skipped.
pub fn historical_files(dir: &Path) -> Result<Vec<PathBuf>, TableError> {
    if !dir.is_dir() {
        return Err(TableError::NotFound(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| TableError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TableError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if TableFormat::from_path(&path).is_none() {
            tracing::trace!(path = %path.display(), "skipping non-table file");
            continue;
        }
        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
