//! Source file discovery for the build system.
//!
//! Finds the `.png` files directly inside the input directory. The sorted
//! order of the result defines sprite IDs, so it must be stable.

use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error during source discovery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// Input directory does not exist
    #[error("Input directory does not exist: {}", .0.display())]
    MissingInput(PathBuf),
    /// Input path is not a directory
    #[error("Input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// IO error during file enumeration
    #[error("Failed to read {}: {}", .0.path().display(), .0.error())]
    Io(#[from] glob::GlobError),
}

/// Check if a path has a `.png` extension (any case).
pub fn is_png_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Find source images in `input_dir`, sorted by file name.
///
/// Subdirectories are not searched. A missing input directory is an error; an
/// empty one is not.
pub fn discover_sprites(input_dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !input_dir.exists() {
        return Err(DiscoveryError::MissingInput(input_dir.to_path_buf()));
    }
    if !input_dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(input_dir.to_path_buf()));
    }

    let escaped = Pattern::escape(&input_dir.to_string_lossy());
    let pattern = format!("{}/*.png", escaped.trim_end_matches('/'));
    let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };

    let paths = glob_with(&pattern, options)
        .map_err(|source| DiscoveryError::InvalidPattern { pattern: pattern.clone(), source })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry?;
        if path.is_file() && is_png_file(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
