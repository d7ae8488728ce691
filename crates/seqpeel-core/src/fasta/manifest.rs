//! File-of-files: one input path per line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PeelError;

/// Reads the input paths listed in `path`. Blank lines are skipped and
/// surrounding whitespace is trimmed; every listed file must exist.
pub fn load_manifest(path: &Path) -> Result<Vec<PathBuf>, PeelError> {
    let text = fs::read_to_string(path).map_err(|source| PeelError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let entry = PathBuf::from(line);
            if entry.is_file() {
                Ok(entry)
            } else {
                Err(PeelError::MissingInput(entry))
            }
        })
        .collect()
}
