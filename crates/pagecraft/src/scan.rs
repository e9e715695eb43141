use crate::error::{PagecraftError, Result};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects every file under `root` whose name ends in `.{extension}`.
/// The walk is sorted by file name, so the result is stable between runs.
pub fn scan_sources(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|error| PagecraftError::WalkDir {
            path: root.to_path_buf(),
            message: error.to_string(),
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            sources.push(entry.into_path());
        }
    }

    debug!("Found {} sources under {}", sources.len(), root.display());

    Ok(sources)
}
